//! Macros for declaring state and event enums.

/// Declare a fieldless enum usable as a machine state or event.
///
/// Derives `Clone, Copy, PartialEq, Eq, Hash, Debug` and adds a `name()`
/// accessor plus an `ALL` slice listing every variant in declaration order,
/// which is convenient for `set_states`.
///
/// # Example
///
/// ```
/// use switchyard::{fsm_enum, Machine};
///
/// fsm_enum! {
///     pub enum Light {
///         Red,
///         Green,
///         Yellow,
///     }
/// }
///
/// let mut machine: Machine<Light, u8> = Machine::new();
/// machine.set_states(Light::ALL.iter().copied()).unwrap();
/// assert_eq!(machine.state_count(), 3);
/// assert_eq!(Light::Yellow.name(), "Yellow");
/// ```
#[macro_export]
macro_rules! fsm_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            #[allow(dead_code)]
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
