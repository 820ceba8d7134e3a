// SPDX-FileCopyrightText: 2026 pjrt-backends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`PluginRuntime`] that loads plugin libraries with `libloading` and talks
//! to them through the PJRT C API.
//!
//! Only the entry points needed to open a client and describe it are bound:
//! plugin initialization, client create/destroy, platform name and version,
//! and the addressable device list.

use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void};
use std::mem::size_of;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::{Arc, Mutex, PoisonError};

use libloading::Library;
use pjrt_core::{Client, ClientOptions, NamedValue, PjrtError, Plugin, PluginDescriptor, PluginRuntime};
use tracing::{debug, info, warn};

/// Symbol every PJRT plugin exports.
const GET_PJRT_API: &[u8] = b"GetPjrtApi\0";

/// Supported major version of the C API.
const PJRT_API_MAJOR: c_int = 0;

type GetPjrtApiFn = unsafe extern "C" fn() -> *const PjrtApi;
type ApiFn = unsafe extern "C" fn(*mut c_void) -> *mut c_void;
type VoidApiFn = unsafe extern "C" fn(*mut c_void);

#[repr(C)]
#[allow(dead_code)]
struct ApiVersion {
    struct_size: usize,
    extension_start: *mut c_void,
    major_version: c_int,
    minor_version: c_int,
}

/// Leading part of `PJRT_Api`, up to the last entry point used here.
#[repr(C)]
#[allow(dead_code)]
struct PjrtApi {
    struct_size: usize,
    extension_start: *mut c_void,
    version: ApiVersion,
    error_destroy: Option<VoidApiFn>,
    error_message: Option<VoidApiFn>,
    error_get_code: Option<ApiFn>,
    plugin_initialize: Option<ApiFn>,
    plugin_attributes: Option<ApiFn>,
    event_destroy: Option<ApiFn>,
    event_is_ready: Option<ApiFn>,
    event_error: Option<ApiFn>,
    event_await: Option<ApiFn>,
    event_on_ready: Option<ApiFn>,
    client_create: Option<ApiFn>,
    client_destroy: Option<ApiFn>,
    client_platform_name: Option<ApiFn>,
    client_process_index: Option<ApiFn>,
    client_platform_version: Option<ApiFn>,
    client_devices: Option<ApiFn>,
    client_addressable_devices: Option<ApiFn>,
}

#[repr(C)]
#[allow(dead_code)]
struct ErrorDestroyArgs {
    struct_size: usize,
    extension_start: *mut c_void,
    error: *mut c_void,
}

#[repr(C)]
#[allow(dead_code)]
struct ErrorMessageArgs {
    struct_size: usize,
    extension_start: *mut c_void,
    error: *const c_void,
    message: *const c_char,
    message_size: usize,
}

#[repr(C)]
#[allow(dead_code)]
struct PluginInitializeArgs {
    struct_size: usize,
    extension_start: *mut c_void,
}

/// `PJRT_NamedValue_Type`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamedValueType {
    String = 0,
    Int64 = 1,
    Int64List = 2,
    Float = 3,
    Bool = 4,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
union NamedValueData {
    string_value: *const c_char,
    int64_value: i64,
    int64_array_value: *const i64,
    float_value: f32,
    bool_value: bool,
}

#[repr(C)]
#[allow(dead_code)]
struct RawNamedValue {
    struct_size: usize,
    extension_start: *mut c_void,
    name: *const c_char,
    name_size: usize,
    value_type: NamedValueType,
    value: NamedValueData,
    value_size: usize,
}

#[repr(C)]
#[allow(dead_code)]
struct ClientCreateArgs {
    struct_size: usize,
    extension_start: *mut c_void,
    create_options: *const RawNamedValue,
    num_options: usize,
    kv_get_callback: *mut c_void,
    kv_get_user_arg: *mut c_void,
    kv_put_callback: *mut c_void,
    kv_put_user_arg: *mut c_void,
    client: *mut c_void,
}

#[repr(C)]
#[allow(dead_code)]
struct ClientDestroyArgs {
    struct_size: usize,
    extension_start: *mut c_void,
    client: *mut c_void,
}

/// Shared shape of `PJRT_Client_PlatformName_Args` and `..._PlatformVersion_Args`.
#[repr(C)]
#[allow(dead_code)]
struct ClientStringArgs {
    struct_size: usize,
    extension_start: *mut c_void,
    client: *mut c_void,
    value: *const c_char,
    value_size: usize,
}

#[repr(C)]
#[allow(dead_code)]
struct ClientDevicesArgs {
    struct_size: usize,
    extension_start: *mut c_void,
    client: *mut c_void,
    devices: *const *mut c_void,
    num_devices: usize,
}

/// A loaded plugin library and the API table it exported.
struct LoadedApi {
    api: *const PjrtApi,
    // Keeps `api` valid; dropped after it.
    _library: Library,
}

// The PJRT C API is thread-safe, and the table is immutable once returned.
unsafe impl Send for LoadedApi {}
unsafe impl Sync for LoadedApi {}

impl LoadedApi {
    fn open(path: &Path) -> Result<Self, PjrtError> {
        // SAFETY: loading runs the library's initializers; plugin files are
        // selected by name pattern from trusted search paths.
        let library = unsafe { Library::new(path) }.map_err(|e| PjrtError::Runtime {
            message: format!("cannot load PJRT plugin library {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        // SAFETY: `GetPjrtApi` takes no arguments and returns a static table.
        let api = unsafe {
            let get_api = library
                .get::<GetPjrtApiFn>(GET_PJRT_API)
                .map_err(|e| PjrtError::Runtime {
                    message: format!("{} does not export GetPjrtApi", path.display()),
                    source: Some(Box::new(e)),
                })?;
            get_api()
        };
        if api.is_null() {
            return Err(PjrtError::runtime(format!(
                "GetPjrtApi returned no API table for {}",
                path.display()
            )));
        }

        let loaded = Self {
            api,
            _library: library,
        };
        let table = loaded.table();
        if table.struct_size < size_of::<PjrtApi>() {
            return Err(PjrtError::runtime(format!(
                "PJRT API table of {} is too old ({} bytes)",
                path.display(),
                table.struct_size
            )));
        }
        if table.version.major_version != PJRT_API_MAJOR {
            return Err(PjrtError::runtime(format!(
                "unsupported PJRT API version {}.{} in {}",
                table.version.major_version,
                table.version.minor_version,
                path.display()
            )));
        }
        Ok(loaded)
    }

    fn table(&self) -> &PjrtApi {
        // SAFETY: checked non-null in `open`, lives as long as the library.
        unsafe { &*self.api }
    }

    fn version(&self) -> (i32, i32) {
        let version = &self.table().version;
        (version.major_version, version.minor_version)
    }

    /// Invoke an entry point taking an args struct and returning `PJRT_Error*`.
    fn call<T>(&self, what: &str, entry: Option<ApiFn>, args: &mut T) -> Result<(), PjrtError> {
        let entry =
            entry.ok_or_else(|| PjrtError::runtime(format!("PJRT API does not provide {what}")))?;
        let error = unsafe { entry((args as *mut T).cast()) };
        if error.is_null() {
            Ok(())
        } else {
            Err(self.consume_error(what, error))
        }
    }

    fn consume_error(&self, what: &str, error: *mut c_void) -> PjrtError {
        let table = self.table();
        let mut message = ErrorMessageArgs {
            struct_size: size_of::<ErrorMessageArgs>(),
            extension_start: ptr::null_mut(),
            error,
            message: ptr::null(),
            message_size: 0,
        };
        let text = match table.error_message {
            Some(error_message) => {
                unsafe { error_message((&mut message as *mut ErrorMessageArgs).cast()) };
                string_from_raw(message.message, message.message_size)
            }
            None => "unknown error".to_string(),
        };

        if let Some(error_destroy) = table.error_destroy {
            let mut destroy = ErrorDestroyArgs {
                struct_size: size_of::<ErrorDestroyArgs>(),
                extension_start: ptr::null_mut(),
                error,
            };
            unsafe { error_destroy((&mut destroy as *mut ErrorDestroyArgs).cast()) };
        }
        PjrtError::runtime(format!("{what} failed: {text}"))
    }
}

fn string_from_raw(data: *const c_char, len: usize) -> String {
    if data.is_null() {
        return String::new();
    }
    let bytes = unsafe { std::slice::from_raw_parts(data.cast::<u8>(), len) };
    String::from_utf8_lossy(bytes).into_owned()
}

/// Encode client options as `PJRT_NamedValue`s.
///
/// The result borrows the option names and values; it must not outlive `options`.
fn named_values(options: &ClientOptions) -> Vec<RawNamedValue> {
    options
        .iter()
        .map(|(name, value)| {
            let (value_type, data, value_size) = match value {
                NamedValue::Str(s) => (
                    NamedValueType::String,
                    NamedValueData {
                        string_value: s.as_ptr().cast(),
                    },
                    s.len(),
                ),
                NamedValue::Int(i) => (
                    NamedValueType::Int64,
                    NamedValueData { int64_value: *i },
                    1,
                ),
                NamedValue::IntList(list) => (
                    NamedValueType::Int64List,
                    NamedValueData {
                        int64_array_value: list.as_ptr(),
                    },
                    list.len(),
                ),
                NamedValue::Float(f) => (
                    NamedValueType::Float,
                    NamedValueData {
                        float_value: *f as f32,
                    },
                    1,
                ),
                NamedValue::Bool(b) => (
                    NamedValueType::Bool,
                    NamedValueData { bool_value: *b },
                    1,
                ),
            };
            RawNamedValue {
                struct_size: size_of::<RawNamedValue>(),
                extension_start: ptr::null_mut(),
                name: name.as_ptr().cast(),
                name_size: name.len(),
                value_type,
                value: data,
                value_size,
            }
        })
        .collect()
}

/// Loads PJRT plugins from their shared libraries.
///
/// Each library is opened once; later loads of the same path share it.
/// Diagnostics suppression is not supported and returns an inactive guard.
#[derive(Default)]
pub struct DylibRuntime {
    loaded: Mutex<HashMap<PathBuf, Arc<DylibPlugin>>>,
}

impl DylibRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PluginRuntime for DylibRuntime {
    fn load_plugin(&self, descriptor: &PluginDescriptor) -> Result<Arc<dyn Plugin>, PjrtError> {
        let path = descriptor.primary_path().ok_or_else(|| {
            PjrtError::runtime(format!("plugin {} has no location", descriptor.name()))
        })?;

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(plugin) = loaded.get(path) {
            return Ok(plugin.clone());
        }

        let api = LoadedApi::open(path)?;
        if api.table().plugin_initialize.is_some() {
            let mut args = PluginInitializeArgs {
                struct_size: size_of::<PluginInitializeArgs>(),
                extension_start: ptr::null_mut(),
            };
            api.call("PJRT_Plugin_Initialize", api.table().plugin_initialize, &mut args)?;
        }

        let (major, minor) = api.version();
        info!(
            plugin = %descriptor.name(),
            path = %path.display(),
            api_version = %format!("{major}.{minor}"),
            "PJRT plugin loaded"
        );
        let plugin = Arc::new(DylibPlugin {
            name: descriptor.name().to_string(),
            path: path.to_path_buf(),
            api: Arc::new(api),
        });
        loaded.insert(path.to_path_buf(), plugin.clone());
        Ok(plugin)
    }
}

/// A plugin library opened by [`DylibRuntime`].
pub struct DylibPlugin {
    name: String,
    path: PathBuf,
    api: Arc<LoadedApi>,
}

impl DylibPlugin {
    /// C API version `(major, minor)` reported by the plugin.
    pub fn api_version(&self) -> (i32, i32) {
        self.api.version()
    }
}

impl Plugin for DylibPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn create_client(&self, options: &ClientOptions) -> Result<Box<dyn Client>, PjrtError> {
        let values = named_values(options);
        let mut args = ClientCreateArgs {
            struct_size: size_of::<ClientCreateArgs>(),
            extension_start: ptr::null_mut(),
            create_options: values.as_ptr(),
            num_options: values.len(),
            kv_get_callback: ptr::null_mut(),
            kv_get_user_arg: ptr::null_mut(),
            kv_put_callback: ptr::null_mut(),
            kv_put_user_arg: ptr::null_mut(),
            client: ptr::null_mut(),
        };
        self.api
            .call("PJRT_Client_Create", self.api.table().client_create, &mut args)?;
        if args.client.is_null() {
            return Err(PjrtError::runtime(format!(
                "PJRT_Client_Create returned no client for plugin {}",
                self.name
            )));
        }
        debug!(plugin = %self.name, "PJRT client opened");
        Ok(Box::new(DylibClient {
            api: Arc::clone(&self.api),
            client: args.client,
        }))
    }
}

/// A `PJRT_Client` owned by this process.
pub struct DylibClient {
    api: Arc<LoadedApi>,
    client: *mut c_void,
}

// PJRT clients may be used from any thread.
unsafe impl Send for DylibClient {}
unsafe impl Sync for DylibClient {}

impl DylibClient {
    fn string_query(&self, what: &str, entry: Option<ApiFn>) -> String {
        if self.client.is_null() {
            return String::new();
        }
        let mut args = ClientStringArgs {
            struct_size: size_of::<ClientStringArgs>(),
            extension_start: ptr::null_mut(),
            client: self.client,
            value: ptr::null(),
            value_size: 0,
        };
        match self.api.call(what, entry, &mut args) {
            Ok(()) => string_from_raw(args.value, args.value_size),
            Err(e) => {
                warn!(error = %e, "PJRT client query failed");
                String::new()
            }
        }
    }
}

impl Client for DylibClient {
    fn platform_name(&self) -> String {
        self.string_query(
            "PJRT_Client_PlatformName",
            self.api.table().client_platform_name,
        )
    }

    fn platform_version(&self) -> String {
        self.string_query(
            "PJRT_Client_PlatformVersion",
            self.api.table().client_platform_version,
        )
    }

    fn device_count(&self) -> usize {
        if self.client.is_null() {
            return 0;
        }
        let mut args = ClientDevicesArgs {
            struct_size: size_of::<ClientDevicesArgs>(),
            extension_start: ptr::null_mut(),
            client: self.client,
            devices: ptr::null(),
            num_devices: 0,
        };
        match self.api.call(
            "PJRT_Client_AddressableDevices",
            self.api.table().client_addressable_devices,
            &mut args,
        ) {
            Ok(()) => args.num_devices,
            Err(e) => {
                warn!(error = %e, "PJRT client query failed");
                0
            }
        }
    }

    fn destroy(&mut self) -> Result<(), PjrtError> {
        if self.client.is_null() {
            return Ok(());
        }
        let mut args = ClientDestroyArgs {
            struct_size: size_of::<ClientDestroyArgs>(),
            extension_start: ptr::null_mut(),
            client: self.client,
        };
        self.client = ptr::null_mut();
        self.api
            .call("PJRT_Client_Destroy", self.api.table().client_destroy, &mut args)
    }
}

impl Drop for DylibClient {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            warn!(error = %e, "failed to destroy PJRT client");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pjrt_test_utils::PluginDir;

    #[test]
    fn named_values_carry_type_and_size() {
        let options = ClientOptions::new()
            .with("allocator", "bfc")
            .with("memory_fraction", 0.5)
            .with("num_nodes", 2i64)
            .with("preallocate", false)
            .with("visible_devices", vec![0i64, 1, 3]);

        let values = named_values(&options);
        let summary: Vec<(NamedValueType, usize, usize)> = values
            .iter()
            .map(|v| (v.value_type, v.name_size, v.value_size))
            .collect();
        assert_eq!(
            summary,
            vec![
                (NamedValueType::String, 9, 3),
                (NamedValueType::Float, 15, 1),
                (NamedValueType::Int64, 9, 1),
                (NamedValueType::Bool, 11, 1),
                (NamedValueType::Int64List, 15, 3),
            ]
        );
        assert!(values.iter().all(|v| v.struct_size == size_of::<RawNamedValue>()));
        assert_eq!(unsafe { values[1].value.float_value }, 0.5);
        assert_eq!(unsafe { values[2].value.int64_value }, 2);
    }

    #[test]
    fn non_library_file_fails_to_load() {
        let dir = PluginDir::with_plugins(&["cpu"]);
        let path = dir.path().join(PluginDir::plugin_file_name("cpu"));
        let descriptor = PluginDescriptor::new("cpu", vec![path]);

        let err = DylibRuntime::new()
            .load_plugin(&descriptor)
            .err()
            .expect("not a shared library");
        assert!(err.to_string().contains("cannot load PJRT plugin library"), "got: {err}");
    }

    #[test]
    fn descriptor_without_location_fails() {
        let err = DylibRuntime::new()
            .load_plugin(&PluginDescriptor::new("cpu", vec![]))
            .err()
            .expect("no location");
        assert!(err.to_string().contains("no location"));
    }

    #[test]
    fn string_from_null_is_empty() {
        assert_eq!(string_from_raw(ptr::null(), 12), "");
        let text = "cuda";
        assert_eq!(string_from_raw(text.as_ptr().cast(), text.len()), "cuda");
    }
}
