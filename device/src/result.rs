//! Raw status codes returned by compute API calls.

use std::fmt;

/// Status of a failed driver call, as the API reported it.
///
/// Positive values are non-error statuses the session still treats as
/// failures (an incomplete enumeration, for instance); negative values are
/// API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultCode(pub i32);

macro_rules! result_codes {
    ($($name:ident = $value:expr),* $(,)?) => {
        impl ResultCode {
            $(pub const $name: Self = Self($value);)*

            /// API name of the code, if it is one this crate knows.
            pub const fn name(self) -> Option<&'static str> {
                match self {
                    $(Self::$name => Some(concat!("VK_", stringify!($name))),)*
                    _ => None,
                }
            }
        }
    };
}

result_codes! {
    SUCCESS = 0,
    NOT_READY = 1,
    TIMEOUT = 2,
    EVENT_SET = 3,
    EVENT_RESET = 4,
    INCOMPLETE = 5,
    ERROR_OUT_OF_HOST_MEMORY = -1,
    ERROR_OUT_OF_DEVICE_MEMORY = -2,
    ERROR_INITIALIZATION_FAILED = -3,
    ERROR_DEVICE_LOST = -4,
    ERROR_MEMORY_MAP_FAILED = -5,
    ERROR_LAYER_NOT_PRESENT = -6,
    ERROR_EXTENSION_NOT_PRESENT = -7,
    ERROR_FEATURE_NOT_PRESENT = -8,
    ERROR_INCOMPATIBLE_DRIVER = -9,
    ERROR_TOO_MANY_OBJECTS = -10,
    ERROR_FORMAT_NOT_SUPPORTED = -11,
    ERROR_FRAGMENTED_POOL = -12,
    ERROR_UNKNOWN = -13,
    ERROR_OUT_OF_POOL_MEMORY = -1_000_069_000,
}

impl ResultCode {
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    pub const fn is_error(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "unknown result code {}", self.0),
        }
    }
}

impl std::error::Error for ResultCode {}

#[cfg(feature = "vulkan")]
impl From<ash::vk::Result> for ResultCode {
    fn from(result: ash::vk::Result) -> Self {
        Self(result.as_raw())
    }
}
