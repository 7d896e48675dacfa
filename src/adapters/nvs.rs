//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the gate configuration. The config is a
//! single `postcard` blob under one namespace/key pair.
//!
//! - Validation: [`GateConfig::validate`] runs before every save and after
//!   every load, so a stale blob from an older build cannot slip through.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - Host builds use an in-memory map with the same encoding.

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::GateConfig;
use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &[u8] = b"smartgate\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"gatecfg\0";
#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 256;

#[cfg(not(target_os = "espidf"))]
const SIM_KEY: &str = "smartgate::gatecfg";

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<&'static str, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the main task before any other NVS access.
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

        // SAFETY: CONFIG_NAMESPACE is NUL-terminated.
        let ret = unsafe { nvs_open(CONFIG_NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle came from a successful nvs_open().
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob() -> Result<Option<Vec<u8>>, i32> {
        let result = Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            // SAFETY: size query with a null buffer.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), core::ptr::null_mut(), &mut size)
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
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => Ok(Some(bytes)),
            // A fresh partition has no namespace yet either.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<GateConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        let stored = self.store.borrow().get(SIM_KEY).cloned();

        #[cfg(target_os = "espidf")]
        let stored = Self::read_blob().map_err(|e| {
            warn!("NvsAdapter: NVS read error {}", e);
            ConfigError::IoError
        })?;

        let Some(bytes) = stored else {
            info!("NvsAdapter: no stored config, using defaults");
            return Ok(GateConfig::default());
        };

        let cfg: GateConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &GateConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.store.borrow_mut().insert(SIM_KEY, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                // SAFETY: `bytes` outlives the call; key is NUL-terminated.
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        CONFIG_KEY.as_ptr().cast(),
                        bytes.as_ptr().cast(),
                        bytes.len(),
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
