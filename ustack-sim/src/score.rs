use core::fmt;

use serde::Serialize;

/// The result of a completed transfer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Score {
    /// The number of bytes host B read, equal to what host A wrote.
    pub bytes: u64,
    /// Simulated time until both directions were closed and acknowledged.
    pub elapsed_ms: u64,
    /// Segments sent by both hosts, acknowledgements included.
    pub segments: u64,
    /// Segments sent again after a timeout, by both hosts.
    pub retransmissions: u64,
    /// Frames put onto a link, by hosts and router.
    pub frames: u64,
    /// Frames lost on a link.
    pub frames_lost: u64,
}

impl Score {
    fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms as f64 / 1000.0
    }

    /// Bytes delivered per simulated second.
    pub fn goodput(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }

        self.bytes as f64 / self.elapsed_secs()
    }

    /// The fraction of frames lost on the links.
    pub fn loss_rate(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }

        self.frames_lost as f64 / self.frames as f64
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Roughly the iperf summary line:
        //
        // ```text
        // [  3]  0.0- 1.0 sec   131 KBytes  1.05 Mbits/sec   0.000 ms    0/   91 (0%)
        // ```
        write!(
            f,
            "0.0-{end:.1} sec\t{total} KBytes\t{rate:.0} Byte/sec\t\
            {retransmissions}/{segments} retransmitted\t{lost}/{frames} frames lost ({loss:.1}%)",
            end = self.elapsed_secs(),
            total = self.bytes / 1024,
            rate = self.goodput(),
            retransmissions = self.retransmissions,
            segments = self.segments,
            lost = self.frames_lost,
            frames = self.frames,
            loss = self.loss_rate() * 100.0,
        )
    }
}
