//! Metering gateway records and their JSON form
//!
//! A [`GatewayData`] owns up to [`MAX_DEVICES`] [`DeviceReading`]s, each of which owns up to
//! [`MAX_DATA_POINTS`] [`MeterDataPoint`]s. Text fields borrow caller owned strings; nothing is
//! copied or allocated. The strings are written verbatim, without escaping, so they must already
//! be valid JSON string content.
//!
//! The JSON form is a one element array:
//!
//! ```text
//! [{
//! "gatewayId":"gateway_1234",
//! "date":"1970-01-01",
//! "deviceType":"stromleser",
//! "interval_minutes":15,
//! "total_readings":1,
//! "values":{
//! "device_count":1,
//! "readings":[
//! {
//! "media":"water",
//! "meter":"waterstarm",
//! "deviceId":"stromleser_50898527",
//! "unit":"m3",
//! "data":[
//! {"timestamp":"1970-01-01 00:00","meter_datetime":"1970-01-01 00:00","total_m3":107.752,"status":"OK"}
//! ]
//! }
//! ]
//! }
//! }]
//! ```

use heapless::Vec;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::ser::{self, Layout, Result};

/// Maximum number of devices a gateway reports
pub const MAX_DEVICES: usize = 4;

/// Maximum number of data points per device
pub const MAX_DATA_POINTS: usize = 8;

/// Line layout of [`serialize_to_json`]: the outer array and the data point objects stay on one
/// line, every other container puts each element on its own line.
pub const GATEWAY_LAYOUT: Layout = Layout::Lines { first: 1, last: 5 };

/// A single timestamped reading
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MeterDataPoint<'a> {
    /// When the gateway took the reading
    pub timestamp: &'a str,
    /// The meter's own clock at the time of the reading
    pub meter_datetime: &'a str,
    /// Total volume, written with three decimals
    #[serde(serialize_with = "crate::num::fixed3")]
    pub total_m3: f32,
    /// Meter status, e.g. `"OK"`
    pub status: &'a str,
}

/// One physical or logical meter
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DeviceReading<'a> {
    /// Measured medium, e.g. `"water"`
    pub media: &'a str,
    /// Meter model
    pub meter: &'a str,
    /// Unique device identifier
    #[serde(rename = "deviceId")]
    pub device_id: &'a str,
    /// Unit of the readings, e.g. `"m3"`
    pub unit: &'a str,
    /// Readings in reporting order
    pub data: Vec<MeterDataPoint<'a>, MAX_DATA_POINTS>,
}

impl<'a> DeviceReading<'a> {
    /// A device without readings
    pub fn new(media: &'a str, meter: &'a str, device_id: &'a str, unit: &'a str) -> Self {
        DeviceReading {
            media,
            meter,
            device_id,
            unit,
            data: Vec::new(),
        }
    }

    /// Appends a reading, handing it back if the device already holds [`MAX_DATA_POINTS`]
    pub fn push(
        &mut self,
        point: MeterDataPoint<'a>,
    ) -> core::result::Result<(), MeterDataPoint<'a>> {
        self.data.push(point)
    }

    /// Number of populated readings
    pub fn data_count(&self) -> usize {
        self.data.len()
    }
}

/// The root record
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayData<'a> {
    /// Gateway identifier
    pub gateway_id: &'a str,
    /// Reporting date
    pub date: &'a str,
    /// Gateway type
    pub device_type: &'a str,
    /// Reading interval in minutes
    pub interval_minutes: i32,
    /// Number of readings the gateway took
    pub total_readings: i32,
    /// Reporting devices in order
    pub devices: Vec<DeviceReading<'a>, MAX_DEVICES>,
}

impl<'a> GatewayData<'a> {
    /// A gateway without devices
    pub fn new(
        gateway_id: &'a str,
        date: &'a str,
        device_type: &'a str,
        interval_minutes: i32,
        total_readings: i32,
    ) -> Self {
        GatewayData {
            gateway_id,
            date,
            device_type,
            interval_minutes,
            total_readings,
            devices: Vec::new(),
        }
    }

    /// Appends a device, handing it back if the gateway already holds [`MAX_DEVICES`]
    pub fn push(
        &mut self,
        device: DeviceReading<'a>,
    ) -> core::result::Result<(), DeviceReading<'a>> {
        self.devices.push(device)
    }

    /// Number of populated devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

#[derive(serde::Serialize)]
struct Values<'r, 'a> {
    device_count: usize,
    readings: &'r [DeviceReading<'a>],
}

impl<'a> Serialize for GatewayData<'a> {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("GatewayData", 6)?;
        state.serialize_field("gatewayId", self.gateway_id)?;
        state.serialize_field("date", self.date)?;
        state.serialize_field("deviceType", self.device_type)?;
        state.serialize_field("interval_minutes", &self.interval_minutes)?;
        state.serialize_field("total_readings", &self.total_readings)?;
        state.serialize_field(
            "values",
            &Values {
                device_count: self.device_count(),
                readings: &self.devices,
            },
        )?;
        state.end()
    }
}

/// Serializes `gateway` into `buf` as `[{...}]`, one field per line
///
/// Returns the number of bytes written, not counting the NUL terminator that follows them.
/// Fails with [`Error::InvalidArgument`](crate::ser::Error::InvalidArgument) if `buf` is empty,
/// and with [`Error::BufferTooSmall`](crate::ser::Error::BufferTooSmall) as soon as a fragment
/// doesn't fit; the buffer then holds partial output that is not valid JSON.
pub fn serialize_to_json(gateway: &GatewayData<'_>, buf: &mut [u8]) -> Result<usize> {
    serialize_to_json_with_layout(gateway, buf, GATEWAY_LAYOUT)
}

/// [`serialize_to_json`] with a caller chosen layout
pub fn serialize_to_json_with_layout(
    gateway: &GatewayData<'_>,
    buf: &mut [u8],
    layout: Layout,
) -> Result<usize> {
    ser::to_slice_with_layout(&[gateway], buf, layout)
}

/// Length of the [`serialize_to_json`] output for `gateway`, not counting the terminator
pub fn json_len(gateway: &GatewayData<'_>) -> Result<usize> {
    ser::measure(&[gateway], GATEWAY_LAYOUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::Error;

    const SAMPLE_LINES: &str = concat!(
        "[{\n",
        "\"gatewayId\":\"gateway_1234\",\n",
        "\"date\":\"1970-01-01\",\n",
        "\"deviceType\":\"stromleser\",\n",
        "\"interval_minutes\":15,\n",
        "\"total_readings\":1,\n",
        "\"values\":{\n",
        "\"device_count\":1,\n",
        "\"readings\":[\n",
        "{\n",
        "\"media\":\"water\",\n",
        "\"meter\":\"waterstarm\",\n",
        "\"deviceId\":\"stromleser_50898527\",\n",
        "\"unit\":\"m3\",\n",
        "\"data\":[\n",
        "{\"timestamp\":\"1970-01-01 00:00\",\"meter_datetime\":\"1970-01-01 00:00\",",
        "\"total_m3\":107.752,\"status\":\"OK\"}\n",
        "]\n",
        "}\n",
        "]\n",
        "}\n",
        "}]",
    );

    const SAMPLE_COMPACT: &str = concat!(
        "[{\"gatewayId\":\"gateway_1234\",\"date\":\"1970-01-01\",\"deviceType\":\"stromleser\",",
        "\"interval_minutes\":15,\"total_readings\":1,\"values\":{\"device_count\":1,\"readings\":[",
        "{\"media\":\"water\",\"meter\":\"waterstarm\",\"deviceId\":\"stromleser_50898527\",",
        "\"unit\":\"m3\",\"data\":[{\"timestamp\":\"1970-01-01 00:00\",",
        "\"meter_datetime\":\"1970-01-01 00:00\",\"total_m3\":107.752,\"status\":\"OK\"}]}]}}]",
    );

    fn point(total_m3: f32) -> MeterDataPoint<'static> {
        MeterDataPoint {
            timestamp: "1970-01-01 00:00",
            meter_datetime: "1970-01-01 00:00",
            total_m3,
            status: "OK",
        }
    }

    fn water_meter(points: usize) -> DeviceReading<'static> {
        let mut device = DeviceReading::new("water", "waterstarm", "stromleser_50898527", "m3");
        for i in 0..points {
            device.push(point(107.752 + i as f32)).unwrap();
        }
        device
    }

    fn sample() -> GatewayData<'static> {
        let mut gateway = GatewayData::new("gateway_1234", "1970-01-01", "stromleser", 15, 1);
        gateway.push(water_meter(1)).unwrap();
        gateway
    }

    fn as_str(buf: &[u8]) -> &str {
        core::str::from_utf8(buf).unwrap()
    }

    #[test]
    fn sample_lines() {
        let buf = &mut [0xaau8; 1024];
        let len = serialize_to_json(&sample(), buf).unwrap();

        assert_eq!(as_str(&buf[..len]), SAMPLE_LINES);
        assert_eq!(len, SAMPLE_LINES.len());
        assert_eq!(buf[len], 0);
        assert_eq!(json_len(&sample()), Ok(len));
    }

    #[test]
    fn sample_compact() {
        let buf = &mut [0u8; 1024];
        let len = serialize_to_json_with_layout(&sample(), buf, Layout::Compact).unwrap();

        assert_eq!(as_str(&buf[..len]), SAMPLE_COMPACT);
    }

    #[test]
    fn sample_parses() {
        let buf = &mut [0u8; 1024];
        let len = serialize_to_json(&sample(), buf).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        let values = &json[0]["values"];
        assert_eq!(values["device_count"].as_u64(), Some(1));
        assert_eq!(
            values["readings"][0]["data"][0]["total_m3"].as_f64(),
            Some(107.752)
        );
        assert_eq!(values["readings"][0]["data"][0]["status"], "OK");
        assert_eq!(values["readings"][0]["deviceId"], "stromleser_50898527");
    }

    #[test]
    fn nested_counts_match_arrays() {
        let mut gateway = GatewayData::new("gw", "2024-02-29", "stromleser", 60, 11);
        gateway.push(water_meter(3)).unwrap();
        gateway.push(water_meter(0)).unwrap();
        gateway.push(water_meter(MAX_DATA_POINTS)).unwrap();

        let buf = &mut [0u8; 4096];
        let len = serialize_to_json(&gateway, buf).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        let readings = json[0]["values"]["readings"].as_array().unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["values"]["device_count"].as_u64(), Some(3));
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0]["data"].as_array().unwrap().len(), 3);
        assert_eq!(readings[1]["data"].as_array().unwrap().len(), 0);
        assert_eq!(
            readings[2]["data"].as_array().unwrap().len(),
            MAX_DATA_POINTS
        );
    }

    #[test]
    fn empty_gateway() {
        let gateway = GatewayData::new("gw", "1970-01-01", "stromleser", 15, 0);

        let buf = &mut [0u8; 256];
        let len = serialize_to_json(&gateway, buf).unwrap();
        assert!(as_str(&buf[..len]).ends_with("\"device_count\":0,\n\"readings\":[\n]\n}\n}]"));

        let json: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(json[0]["values"]["readings"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn empty_device_data() {
        let mut gateway = sample();
        gateway.devices[0].data.clear();

        let buf = &mut [0u8; 1024];
        let len = serialize_to_json(&gateway, buf).unwrap();
        assert!(as_str(&buf[..len]).contains("\"unit\":\"m3\",\n\"data\":[\n]\n}\n]"));
    }

    #[test]
    fn data_point_commas() {
        let mut gateway = GatewayData::new("gw", "1970-01-01", "stromleser", 15, 3);
        gateway.push(water_meter(3)).unwrap();

        let buf = &mut [0u8; 1024];
        let len = serialize_to_json_with_layout(&gateway, buf, Layout::Compact).unwrap();
        let json = as_str(&buf[..len]);

        assert_eq!(json.matches("},{\"timestamp\"").count(), 2);
        assert_eq!(json.matches(",]").count(), 0);
        assert!(json.contains("\"status\":\"OK\"}]}]"));
    }

    #[test]
    fn device_commas() {
        let mut gateway = GatewayData::new("gw", "1970-01-01", "stromleser", 15, 4);
        for _ in 0..MAX_DEVICES {
            gateway.push(water_meter(1)).unwrap();
        }

        let buf = &mut [0u8; 4096];
        let len = serialize_to_json(&gateway, buf).unwrap();
        let json = as_str(&buf[..len]);

        assert_eq!(json.matches("},\n{\n\"media\"").count(), MAX_DEVICES - 1);
        assert!(json.contains("]\n}\n]\n}\n}]"));
    }

    #[test]
    fn minimal_buffer() {
        let gateway = sample();
        let needed = json_len(&gateway).unwrap();
        let buf = &mut [0u8; 1024];

        assert_eq!(
            serialize_to_json(&gateway, &mut buf[..needed]),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(serialize_to_json(&gateway, &mut buf[..needed + 1]), Ok(needed));
        assert_eq!(buf[needed], 0);
    }

    #[test]
    fn larger_buffers_give_identical_output() {
        let gateway = sample();
        let needed = json_len(&gateway).unwrap();

        for capacity in needed + 1..needed + 64 {
            let buf = &mut [0u8; 1024];
            let len = serialize_to_json(&gateway, &mut buf[..capacity]).unwrap();
            assert_eq!(as_str(&buf[..len]), SAMPLE_LINES);
        }
    }

    #[test]
    fn first_fragment_does_not_fit() {
        let buf = &mut [0xaau8; 1];
        assert_eq!(
            serialize_to_json(&sample(), buf),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(buf[0], 0xaa);
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(
            serialize_to_json(&sample(), &mut []),
            Err(Error::InvalidArgument)
        );
        assert_eq!(Error::InvalidArgument.code(), 2);
    }

    #[test]
    fn volume_formatting() {
        let mut device = DeviceReading::new("heat", "sensostar", "hm_1", "m3");
        device.push(point(1.0)).unwrap();
        device.push(point(0.0005)).unwrap();
        device.push(point(0.0)).unwrap();
        let mut gateway = GatewayData::new("gw", "1970-01-01", "stromleser", 15, 3);
        gateway.push(device).unwrap();

        let buf = &mut [0u8; 1024];
        let len = serialize_to_json(&gateway, buf).unwrap();
        let json = as_str(&buf[..len]);

        assert!(json.contains("\"total_m3\":1.000,"));
        assert!(json.contains("\"total_m3\":0.001,"));
        assert!(json.contains("\"total_m3\":0.000,"));
    }

    #[test]
    fn strings_are_written_verbatim() {
        let gateway = GatewayData::new("a\"b\\c", "1970-01-01", "stromleser", -5, 0);

        let buf = &mut [0u8; 256];
        let len = serialize_to_json(&gateway, buf).unwrap();
        let json = as_str(&buf[..len]);

        assert!(json.contains("\"gatewayId\":\"a\"b\\c\",\n"));
        assert!(json.contains("\"interval_minutes\":-5,\n"));
    }

    #[test]
    fn capacity_is_bounded() {
        let mut device = water_meter(MAX_DATA_POINTS);
        assert_eq!(device.push(point(1.0)), Err(point(1.0)));
        assert_eq!(device.data_count(), MAX_DATA_POINTS);

        let mut gateway = sample();
        for _ in 1..MAX_DEVICES {
            gateway.push(water_meter(0)).unwrap();
        }
        assert!(gateway.push(water_meter(0)).is_err());
        assert_eq!(gateway.device_count(), MAX_DEVICES);
    }
}
