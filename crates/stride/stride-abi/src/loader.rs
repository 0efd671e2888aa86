//! Loader ⇄ API-layer negotiation and chain structures
//! (`loader_interfaces.h` in the OpenXR SDK).

use crate::pfn::{PfnCreateApiLayerInstance, PfnGetInstanceProcAddr};
use std::ffi::{c_char, c_void};

pub const MAX_API_LAYER_NAME_SIZE: usize = 256;

/// The only loader/layer interface version this crate speaks.
pub const CURRENT_LOADER_API_LAYER_VERSION: u32 = 1;

/// `XrVersion`: major(16) | minor(16) | patch(32).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(pub u64);

impl Version {
    pub const fn new(major: u16, minor: u16, patch: u32) -> Self {
        Self(((major as u64) << 48) | ((minor as u64) << 32) | patch as u64)
    }

    pub fn major(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub fn minor(self) -> u16 {
        (self.0 >> 32) as u16
    }

    pub fn patch(self) -> u32 {
        self.0 as u32
    }
}

pub const CURRENT_API_VERSION: Version = Version::new(1, 0, 0);

/// `XrLoaderInterfaceStructs`
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoaderInterfaceStruct(pub i32);

impl LoaderInterfaceStruct {
    pub const LOADER_INFO: Self = Self(1);
    pub const API_LAYER_REQUEST: Self = Self(2);
    pub const API_LAYER_CREATE_INFO: Self = Self(4);
    pub const API_LAYER_NEXT_INFO: Self = Self(5);
}

/// `XrInstanceCreateInfo`. The layer only forwards it, so it stays opaque.
#[repr(C)]
pub struct InstanceCreateInfo {
    _opaque: [u8; 0],
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct NegotiateLoaderInfo {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub min_interface_version: u32,
    pub max_interface_version: u32,
    pub min_api_version: Version,
    pub max_api_version: Version,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct NegotiateApiLayerRequest {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub layer_interface_version: u32,
    pub layer_api_version: Version,
    pub get_instance_proc_addr: Option<PfnGetInstanceProcAddr>,
    pub create_api_layer_instance: Option<PfnCreateApiLayerInstance>,
}

/// One link of the chain the loader hands to `xrCreateApiLayerInstance`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ApiLayerNextInfo {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub layer_name: [c_char; MAX_API_LAYER_NAME_SIZE],
    pub next_get_instance_proc_addr: Option<PfnGetInstanceProcAddr>,
    pub next_create_api_layer_instance: Option<PfnCreateApiLayerInstance>,
    pub next: *mut ApiLayerNextInfo,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct ApiLayerCreateInfo {
    pub struct_type: LoaderInterfaceStruct,
    pub struct_version: u32,
    pub struct_size: usize,
    pub loader_instance: *mut c_void,
    pub next_info_name: [c_char; MAX_API_LAYER_NAME_SIZE],
    pub next_get_instance_proc_addr: Option<PfnGetInstanceProcAddr>,
    pub next_info: *mut ApiLayerNextInfo,
}
