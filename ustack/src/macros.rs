/// Define an enumeration of registered field values with a fallback for everything else.
///
/// Header fields such as the EtherType or the ARP operation are registries: only a few values
/// have a meaning we know of, every other bit pattern must still round-trip unchanged. The macro
/// derives the enum and both conversions from and into the underlying integer.
///
/// ```ignore
/// enum_with_unknown! {
///     /// ARP operation.
///     pub enum Operation(u16) {
///         Request = 1,
///         Reply = 2,
///     }
/// }
/// ```
macro_rules! enum_with_unknown {
    (
        $( #[$enum_attr:meta] )*
        $vis:vis enum $name:ident($ty:ty) {
            $(
              $( #[$variant_attr:meta] )*
              $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
        $( #[$enum_attr] )*
        $vis enum $name {
            $(
              $( #[$variant_attr] )*
              #[allow(missing_docs)]
              $variant,
            )+
            /// A value without registered meaning, kept verbatim.
            Unknown($ty),
        }

        impl ::core::convert::From<$ty> for $name {
            fn from(value: $ty) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => $name::Unknown(other),
                }
            }
        }

        impl ::core::convert::From<$name> for $ty {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value, )+
                    $name::Unknown(other) => other,
                }
            }
        }
    }
}
