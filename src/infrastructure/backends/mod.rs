pub mod platform;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::Backend;
use crate::domain::models::BackendName;

pub type BackendBox = Box<dyn Backend + Send + Sync>;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<BackendBox> {
        if name == BackendName::Platform {
            return Ok(Box::<platform::Platform>::default());
        }

        bail!(format!("No backend implemented for {name}"))
    }
}
