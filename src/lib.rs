//! Allocation-free JSON for metering gateways
//!
//! This crate turns a [`GatewayData`] record (a data collection unit and the energy, water or
//! heat meters it reads) into JSON text inside a caller supplied `&mut [u8]`. It is aimed at
//! applications that run on resource constrained devices.
//!
//! # Current features
//!
//! - The error type is a simple C like enum with stable numeric codes (`1` buffer too small, `2`
//!   invalid argument)
//! - Serialization doesn't require memory allocations
//! - Every fragment is bounds checked before it is written: a fragment is only appended if it
//!   leaves room for a trailing NUL byte, so the buffer can't overflow
//! - [`measure`] computes the exact output length up front
//! - The serializer is a `serde` serializer, so other types can be written with [`to_slice`]
//!   as well. Supported are:
//!   - `bool`
//!   - Integers
//!   - Floats (shortest form, or three decimals through [`num::Fixed3`])
//!   - `str` and `char` (\*)
//!   - `Option`
//!   - Arrays
//!   - Tuples
//!   - Structs and maps
//!   - C like enums and newtype variants
//!
//! (\*) Serialization of strings doesn't escape anything. Text fields are trusted to already be
//! valid JSON string content.
//!
//! # Example
//!
//! ```
//! use gateway_json_core::{DeviceReading, GatewayData, MeterDataPoint};
//!
//! let mut device = DeviceReading::new("water", "waterstarm", "stromleser_50898527", "m3");
//! device
//!     .push(MeterDataPoint {
//!         timestamp: "1970-01-01 00:00",
//!         meter_datetime: "1970-01-01 00:00",
//!         total_m3: 107.752,
//!         status: "OK",
//!     })
//!     .unwrap();
//!
//! let mut gateway = GatewayData::new("gateway_1234", "1970-01-01", "stromleser", 15, 1);
//! gateway.push(device).unwrap();
//!
//! let mut buf = [0u8; 1024];
//! let len = gateway_json_core::serialize_to_json(&gateway, &mut buf).unwrap();
//! assert!(buf[..len].starts_with(b"[{\n\"gatewayId\":\"gateway_1234\",\n"));
//! assert_eq!(buf[len], 0);
//! ```
//!
//! # Non-features
//!
//! This is explicitly out of scope
//!
//! - Anything that involves dynamic memory allocation
//! - Parsing JSON back into records
//! - Writing to unbounded sinks
#![deny(missing_docs)]
#![no_std]

pub mod gateway;
pub mod num;
pub mod ser;

#[doc(inline)]
pub use self::gateway::{
    json_len, serialize_to_json, serialize_to_json_with_layout, DeviceReading, GatewayData,
    MeterDataPoint, GATEWAY_LAYOUT, MAX_DATA_POINTS, MAX_DEVICES,
};
#[doc(inline)]
pub use self::ser::{measure, to_slice, to_slice_with_layout, to_string, to_vec, Error, Layout};
