//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`]: the whole [`SystemConfig`] is one postcard
//! blob under `thermo/syscfg`.  The per-device MLX90641 [`Calibration`]
//! lives next to it under `thermo/mlxcal`.
//!
//! - Both blobs are validated before persistence; invalid ranges are rejected.
//! - ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - The simulation backend is an in-memory map.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;
use crate::sensors::mlx90641::Calibration;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
const CONFIG_NAMESPACE: &str = "thermo";
#[cfg(not(target_os = "espidf"))]
const CONFIG_KEY: &str = "syscfg";
#[cfg(not(target_os = "espidf"))]
const CALIBRATION_KEY: &str = "mlxcal";

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE_C: &[u8] = b"thermo\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"syscfg\0";
#[cfg(target_os = "espidf")]
const CALIBRATION_KEY: &[u8] = b"mlxcal\0";
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 1024;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the single main-task context before any
            // concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(key: &str) -> String {
        format!("{}::{}", CONFIG_NAMESPACE, key)
    }

    /// Open the config namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        // SAFETY: namespace is a null-terminated static string.
        let ret = unsafe { nvs_open(CONFIG_NAMESPACE_C.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        let result = f(handle);
        // SAFETY: handle was opened above.
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(key: &[u8]) -> Result<Vec<u8>, i32> {
        Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            // SAFETY: null buffer queries the stored size.
            let ret = unsafe {
                nvs_get_blob(handle, key.as_ptr().cast(), core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH as i32);
            }
            let mut buf = vec![0u8; size];
            // SAFETY: buf holds `size` bytes.
            let ret = unsafe {
                nvs_get_blob(handle, key.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(buf)
        })
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(key: &[u8], bytes: &[u8]) -> Result<(), i32> {
        Self::with_nvs_handle(true, |handle| {
            // SAFETY: bytes outlives the call.
            let ret = unsafe {
                nvs_set_blob(handle, key.as_ptr().cast(), bytes.as_ptr().cast(), bytes.len())
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        })
    }
}

// ── Blob access ───────────────────────────────────────────────

impl NvsAdapter {
    /// Stored blob under `key`, `None` if absent.
    #[cfg(not(target_os = "espidf"))]
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.store.borrow().get(&Self::composite_key(key)).cloned())
    }

    #[cfg(target_os = "espidf")]
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ConfigError> {
        match Self::read_blob(key) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Ok(None),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ConfigError> {
        self.store.borrow_mut().insert(Self::composite_key(key), bytes);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn put(&self, key: &[u8], bytes: Vec<u8>) -> Result<(), ConfigError> {
        Self::write_blob(key, &bytes).map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            ConfigError::IoError
        })
    }

    /// The array calibration measured for this device, `None` if it was
    /// never stored.
    pub fn load_calibration(&self) -> Result<Option<Calibration>, ConfigError> {
        let Some(bytes) = self.get(CALIBRATION_KEY)? else {
            return Ok(None);
        };
        let cal: Calibration = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        cal.validate()?;
        info!("NvsAdapter: loaded array calibration ({} bytes)", bytes.len());
        Ok(Some(cal))
    }

    pub fn save_calibration(&self, calibration: &Calibration) -> Result<(), ConfigError> {
        calibration.validate()?;
        let bytes = postcard::to_allocvec(calibration).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();
        self.put(CALIBRATION_KEY, bytes)?;
        info!("NvsAdapter: array calibration saved ({} bytes)", len);
        Ok(())
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        match self.get(CONFIG_KEY)? {
            Some(bytes) => {
                let cfg: SystemConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate()?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();
        self.put(CONFIG_KEY, bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", len);
        Ok(())
    }
}
