//! Device-family contract for job compatibility checks

use crate::device::DeviceConfig;
use crate::error::ConfigurationError;

/// A family of devices that knows which jobs it can run.
///
/// [`DeviceConfig`] does not implement this trait, so a compatibility check
/// can only be requested from a concrete family. Call
/// [`DeviceFamily::check_config`] once per job before any deployment action
/// is built.
pub trait DeviceFamily {
    /// The job description this family validates against
    type Job: ?Sized;

    fn device(&self) -> &DeviceConfig;

    fn device_mut(&mut self) -> &mut DeviceConfig;

    fn check_config(&self, job: &Self::Job) -> Result<(), ConfigurationError>;
}
