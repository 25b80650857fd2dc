//! Configuration of a single dispatch.
//!
//! Built explicitly through the bon builder, or from environment variables
//! with [`RuntimeConfig::from_env`].

use std::fmt;

use bon::bon;

/// Environment variable holding the work group counts as `x,y,z`.
pub const WORK_GROUPS_ENV: &str = "SPINDLE_WORK_GROUPS";
/// Environment variable holding the shader entry point name.
pub const ENTRY_POINT_ENV: &str = "SPINDLE_ENTRY_POINT";

/// Number of work groups dispatched along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkGroups {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorkGroups {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn as_array(self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    /// Parses `x,y,z`. Missing trailing counts default to one.
    pub fn parse(text: &str) -> Option<Self> {
        let mut counts = [1u32; 3];
        let mut parts = text.split(',');
        for slot in &mut counts {
            match parts.next() {
                Some(part) => *slot = part.trim().parse().ok()?,
                None => break,
            }
        }
        parts.next().is_none().then_some(Self::new(counts[0], counts[1], counts[2]))
    }
}

impl Default for WorkGroups {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for WorkGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub work_groups: WorkGroups,
    pub entry_point: String,
    /// Compiled shader binary, passed to the driver unchanged.
    pub shader: Vec<u8>,
    pub application_name: String,
}

#[bon]
impl RuntimeConfig {
    #[builder]
    pub fn new(
        shader: Vec<u8>,
        #[builder(default)] work_groups: WorkGroups,
        #[builder(default = "main".to_string(), into)] entry_point: String,
        #[builder(default = "spindle runtime".to_string(), into)] application_name: String,
    ) -> Self {
        Self { work_groups, entry_point, shader, application_name }
    }

    /// Configuration for `shader` with the dispatch read from the environment.
    ///
    /// # Environment Variables
    ///
    /// * `SPINDLE_WORK_GROUPS` - Work group counts as `x,y,z` (default: `1,1,1`)
    /// * `SPINDLE_ENTRY_POINT` - Shader entry point (default: `main`)
    pub fn from_env(shader: Vec<u8>) -> Self {
        let work_groups = std::env::var(WORK_GROUPS_ENV).ok().and_then(|s| WorkGroups::parse(&s));
        let entry_point = std::env::var(ENTRY_POINT_ENV).ok();
        Self::builder().shader(shader).maybe_work_groups(work_groups).maybe_entry_point(entry_point).build()
    }
}
