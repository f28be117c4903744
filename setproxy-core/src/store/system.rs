//! WinINet per-connection proxy options

use super::{ProxyStore, StoreResult};
use crate::error::StoreError;
use crate::option::{ConfigOption, ConnectionScope, OptionId, OptionValue, ProxyFlags};
use std::ffi::c_void;
use std::mem;
use std::ptr;
use windows_sys::Win32::Foundation::{GetLastError, GlobalFree};
use windows_sys::Win32::Networking::WinInet::{
    InternetQueryOptionW, InternetSetOptionW, INTERNET_PER_CONN_OPTIONW,
    INTERNET_PER_CONN_OPTIONW_0, INTERNET_PER_CONN_OPTION_LISTW,
};

const INTERNET_OPTION_REFRESH: u32 = 37;
const INTERNET_OPTION_PER_CONNECTION_OPTION: u32 = 75;

/// The current user's WinINet settings
#[derive(Debug, Default)]
pub struct SystemStore;

impl SystemStore {
    pub fn new() -> Self {
        Self
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Copy a NUL-terminated wide string and release it with `GlobalFree`
///
/// # Safety
/// `p` must be null or a string allocated by WinINet.
unsafe fn take_wide(p: *mut u16) -> Option<String> {
    if p.is_null() {
        return None;
    }
    let mut len = 0;
    while *p.add(len) != 0 {
        len += 1;
    }
    let s = String::from_utf16_lossy(std::slice::from_raw_parts(p, len));
    GlobalFree(p as _);
    Some(s)
}

fn last_error() -> StoreError {
    StoreError::Os {
        code: unsafe { GetLastError() },
    }
}

fn list_for(
    scope_name: &mut Option<Vec<u16>>,
    options: &mut [INTERNET_PER_CONN_OPTIONW],
) -> INTERNET_PER_CONN_OPTION_LISTW {
    INTERNET_PER_CONN_OPTION_LISTW {
        dwSize: mem::size_of::<INTERNET_PER_CONN_OPTION_LISTW>() as u32,
        pszConnection: scope_name
            .as_mut()
            .map_or(ptr::null_mut(), |name| name.as_mut_ptr()),
        dwOptionCount: options.len() as u32,
        dwOptionError: 0,
        pOptions: options.as_mut_ptr(),
    }
}

impl ProxyStore for SystemStore {
    fn read(&self, scope: &ConnectionScope, ids: &[OptionId]) -> StoreResult<Vec<ConfigOption>> {
        let mut scope_name = scope.name().map(to_wide);
        let mut raw: Vec<INTERNET_PER_CONN_OPTIONW> = ids
            .iter()
            .map(|id| INTERNET_PER_CONN_OPTIONW {
                dwOption: id.code(),
                Value: INTERNET_PER_CONN_OPTIONW_0 { dwValue: 0 },
            })
            .collect();
        let mut list = list_for(&mut scope_name, &mut raw);
        let mut size = mem::size_of::<INTERNET_PER_CONN_OPTION_LISTW>() as u32;

        let ok = unsafe {
            InternetQueryOptionW(
                ptr::null(),
                INTERNET_OPTION_PER_CONNECTION_OPTION,
                &mut list as *mut _ as *mut c_void,
                &mut size,
            )
        };
        if ok == 0 {
            return Err(last_error());
        }

        let options = ids
            .iter()
            .zip(raw.iter())
            .map(|(id, opt)| match id {
                OptionId::Flags => {
                    ConfigOption::flags(ProxyFlags::from_bits_retain(unsafe { opt.Value.dwValue }))
                }
                _ => match unsafe { take_wide(opt.Value.pszValue) } {
                    Some(s) => ConfigOption::text(*id, s),
                    None => ConfigOption::absent(*id),
                },
            })
            .collect();

        Ok(options)
    }

    fn write(&mut self, scope: &ConnectionScope, options: &[ConfigOption]) -> StoreResult<()> {
        let mut scope_name = scope.name().map(to_wide);
        // Owns the wide strings the raw options point into
        let mut strings: Vec<Vec<u16>> = options
            .iter()
            .map(|opt| match &opt.value {
                OptionValue::Text(s) => to_wide(s),
                _ => Vec::new(),
            })
            .collect();

        let mut raw: Vec<INTERNET_PER_CONN_OPTIONW> = options
            .iter()
            .zip(strings.iter_mut())
            .map(|(opt, wide)| {
                let value = match &opt.value {
                    OptionValue::Flags(flags) => INTERNET_PER_CONN_OPTIONW_0 {
                        dwValue: flags.bits(),
                    },
                    OptionValue::Text(_) => INTERNET_PER_CONN_OPTIONW_0 {
                        pszValue: wide.as_mut_ptr(),
                    },
                    OptionValue::Absent => INTERNET_PER_CONN_OPTIONW_0 {
                        pszValue: ptr::null_mut(),
                    },
                };
                INTERNET_PER_CONN_OPTIONW {
                    dwOption: opt.id.code(),
                    Value: value,
                }
            })
            .collect();
        let mut list = list_for(&mut scope_name, &mut raw);

        let ok = unsafe {
            InternetSetOptionW(
                ptr::null(),
                INTERNET_OPTION_PER_CONNECTION_OPTION,
                &mut list as *mut _ as *const c_void,
                mem::size_of::<INTERNET_PER_CONN_OPTION_LISTW>() as u32,
            )
        };
        if ok == 0 {
            return Err(last_error());
        }
        Ok(())
    }

    fn refresh(&mut self) -> StoreResult<()> {
        let ok = unsafe { InternetSetOptionW(ptr::null(), INTERNET_OPTION_REFRESH, ptr::null(), 0) };
        if ok == 0 {
            return Err(last_error());
        }
        Ok(())
    }
}
