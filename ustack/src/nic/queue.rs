use std::collections::VecDeque;

use crate::wire::EthernetFrame;
use super::Port;

/// A software port that buffers all transmitted frames in order.
///
/// The frames stay in the queue until taken out with `pop` or `drain`. A simulated link moves
/// them from the queue of one port into the receiving end of another interface.
#[derive(Clone, Debug, Default)]
pub struct Queue {
    frames: VecDeque<EthernetFrame>,
    transmitted: usize,
}

impl Queue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Queue::default()
    }

    /// Take the oldest transmitted frame.
    pub fn pop(&mut self) -> Option<EthernetFrame> {
        self.frames.pop_front()
    }

    /// Take all transmitted frames, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item=EthernetFrame> + '_ {
        self.frames.drain(..)
    }

    /// Inspect the frames not yet taken.
    pub fn frames(&self) -> impl Iterator<Item=&EthernetFrame> + '_ {
        self.frames.iter()
    }

    /// The number of frames not yet taken.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames to take.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The number of frames ever transmitted on this port.
    pub fn transmitted(&self) -> usize {
        self.transmitted
    }
}

impl Port for Queue {
    fn transmit(&mut self, frame: EthernetFrame) {
        self.transmitted += 1;
        self.frames.push_back(frame);
    }
}
