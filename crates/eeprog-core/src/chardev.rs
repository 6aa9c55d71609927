//! Character-device lifecycle
//!
//! One registered device binds a device number and a user-visible node
//! to exactly one bus adapter. The registration framework itself - the
//! thing that hands out numbers, creates nodes under a class, and binds
//! file operations - is an external collaborator consumed through the
//! [`RegistrationFramework`] trait.
//!
//! Registration unwinds fully on partial failure: whatever step fails,
//! every resource acquired by the earlier steps is released before the
//! error is reported, and each failing step maps to its own error. A
//! half-registered device never escapes this module.
//!
//! Opened [`FileHandle`]s share the device's bus adapter behind a
//! mutex. The lock is taken before a read or write touches the bus and
//! held until its staging buffers are gone, so the offset-select and
//! data transactions of one call never interleave with another call's.

use crate::bus::I2cMaster;
use crate::engine::{self, EepromConfig};
use crate::error::{Error, Result};
use crate::uaccess::UserBuffer;

use std::string::{String, ToString};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A major/minor device number pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevId {
    /// Major number identifying the driver
    pub major: u32,
    /// Minor number identifying the device instance
    pub minor: u32,
}

/// Identity of one registered device
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// Allocated device number
    pub devt: DevId,
    /// Class the node was created under
    pub class: String,
    /// Node name visible to callers
    pub name: String,
}

/// The registration framework consumed by this module
///
/// Mirrors the usual kernel sequence: allocate a device-number region,
/// create the node under a class, bind the file-operation table. Each
/// acquire has a matching release; releases are infallible.
pub trait RegistrationFramework {
    /// Allocate a device-number region for `name`
    fn alloc_region(&mut self, name: &str) -> Result<DevId>;

    /// Release a previously allocated region
    fn release_region(&mut self, devt: DevId);

    /// Create the user-visible node for `devt` under `class`
    fn create_node(&mut self, class: &str, devt: DevId, name: &str) -> Result<()>;

    /// Destroy a previously created node
    fn destroy_node(&mut self, devt: DevId);

    /// Bind the file-operation table to `devt`
    fn bind_ops(&mut self, devt: DevId) -> Result<()>;

    /// Unbind the file-operation table from `devt`
    fn unbind_ops(&mut self, devt: DevId);
}

/// A registered character device owning one bus adapter
#[derive(Debug)]
pub struct CharDevice<M> {
    identity: DeviceIdentity,
    cfg: EepromConfig,
    bus: Arc<Mutex<M>>,
}

/// Register a device and bind it to a bus adapter
///
/// Runs the three framework steps in order and unwinds on failure:
/// a failed region allocation reports [`Error::RegistrationFailed`]; a
/// failed node creation releases the region and reports
/// [`Error::NodeCreationFailed`]; a failed binding destroys the node,
/// releases the region, and reports [`Error::BindFailed`].
pub fn register_device<R, M>(
    framework: &mut R,
    class: &str,
    name: &str,
    bus: M,
    cfg: EepromConfig,
) -> Result<CharDevice<M>>
where
    R: RegistrationFramework + ?Sized,
    M: I2cMaster,
{
    let devt = match framework.alloc_region(name) {
        Ok(devt) => devt,
        Err(e) => {
            log::warn!("chardev: region allocation for {} failed: {}", name, e);
            return Err(Error::RegistrationFailed);
        }
    };
    log::debug!(
        "chardev: {} got major {} minor {}",
        name,
        devt.major,
        devt.minor
    );

    if let Err(e) = framework.create_node(class, devt, name) {
        log::warn!("chardev: node creation for {} failed: {}", name, e);
        framework.release_region(devt);
        return Err(Error::NodeCreationFailed);
    }

    if let Err(e) = framework.bind_ops(devt) {
        log::warn!("chardev: operation binding for {} failed: {}", name, e);
        framework.destroy_node(devt);
        framework.release_region(devt);
        return Err(Error::BindFailed);
    }

    Ok(CharDevice {
        identity: DeviceIdentity {
            devt,
            class: class.to_string(),
            name: name.to_string(),
        },
        cfg,
        bus: Arc::new(Mutex::new(bus)),
    })
}

/// Tear a device down and recover its bus adapter
///
/// Unbinds, destroys the node, releases the region. Consuming the
/// device makes a second teardown unrepresentable. The adapter is
/// returned when no open [`FileHandle`] still references it.
pub fn unregister_device<R, M>(framework: &mut R, dev: CharDevice<M>) -> Option<M>
where
    R: RegistrationFramework + ?Sized,
{
    let devt = dev.identity.devt;
    framework.unbind_ops(devt);
    framework.destroy_node(devt);
    framework.release_region(devt);
    log::debug!("chardev: unregistered {}", dev.identity.name);

    Arc::try_unwrap(dev.bus)
        .ok()
        .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
}

impl<M: I2cMaster> CharDevice<M> {
    /// Identity assigned at registration
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Protocol configuration this device was registered with
    pub fn config(&self) -> &EepromConfig {
        &self.cfg
    }

    /// Open a file handle against this device
    ///
    /// Handles are not exclusive; any number may be open at once. Each
    /// carries a shared reference to the device's bus adapter.
    pub fn open(&self) -> FileHandle<M> {
        FileHandle {
            cfg: self.cfg.clone(),
            bus: Arc::clone(&self.bus),
        }
    }
}

/// An open handle to a registered device
pub struct FileHandle<M> {
    cfg: EepromConfig,
    bus: Arc<Mutex<M>>,
}

impl<M> Clone for FileHandle<M> {
    fn clone(&self) -> Self {
        Self {
            cfg: self.cfg.clone(),
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<M: I2cMaster> FileHandle<M> {
    fn lock(&self) -> MutexGuard<'_, M> {
        // A caller that panicked mid-transfer left no partial protocol
        // state behind worth rejecting the bus for.
        self.bus.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read into a caller buffer at the configured read offset
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.read_into(buf)
    }

    /// Read into any [`UserBuffer`] at the configured read offset
    pub fn read_into<U: UserBuffer + ?Sized>(&self, dst: &mut U) -> Result<usize> {
        let mut bus = self.lock();
        engine::read(&mut *bus, &self.cfg, self.cfg.read_offset, dst)
    }

    /// Write caller bytes, offset header included, to the part
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        self.write_from(data)
    }

    /// Write from any [`UserBuffer`] to the part
    pub fn write_from<U: UserBuffer + ?Sized>(&self, src: &U) -> Result<usize> {
        let mut bus = self.lock();
        engine::write(&mut *bus, &self.cfg, src)
    }
}
