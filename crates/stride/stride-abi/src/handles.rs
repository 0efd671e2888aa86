// Every handle is a newtype over u64 with repr(transparent), so it can sit
// directly in the C structs and in extern "system" signatures. The value is
// never dereferenced here; it is only stored, hashed and compared.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: Self = Self(0);

            #[inline]
            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

define_handle!(
    /// `XrInstance`
    InstanceHandle
);
define_handle!(
    /// `XrSession`
    SessionHandle
);
define_handle!(
    /// `XrAction`: one application-defined input action. Used as a set key.
    ActionHandle
);
define_handle!(
    /// `XrPath`: an atom the runtime interns for a path string.
    /// `Path::NULL` doubles as the "any subaction" wildcard.
    Path
);
