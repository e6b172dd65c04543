//! OpenTherm message ID catalogue.
//!
//! Carried verbatim from the upstream Arduino library's `#define` table
//! (`original_source/opentherm.h`). The core never validates or
//! interprets an `id` field against this list — it is passthrough data
//! for callers building and reading frames.

#![allow(missing_docs)]

/// Data-ID registers defined by the OpenTherm 2.2 spec.
pub mod data_id {
    pub const STATUS: u8 = 0;
    pub const CONTROL_SETPOINT: u8 = 1;
    pub const MASTER_CONFIG: u8 = 2;
    pub const SLAVE_CONFIG: u8 = 3;
    pub const COMMAND_CODE: u8 = 4;
    pub const FAULT_FLAGS: u8 = 5;
    pub const REMOTE: u8 = 6;
    pub const COOLING_CONTROL: u8 = 7;
    pub const CONTROL_SETPOINT_CH2: u8 = 8;
    pub const CH_SETPOINT_OVERRIDE: u8 = 9;

    pub const ROOM_SETPOINT: u8 = 16;
    pub const MODULATION_LEVEL: u8 = 17;
    pub const CH_WATER_PRESSURE: u8 = 18;
    pub const DHW_FLOW_RATE: u8 = 19;
    pub const DAY_TIME: u8 = 20;
    pub const DATE: u8 = 21;
    pub const YEAR: u8 = 22;
    pub const ROOM_SETPOINT_CH2: u8 = 23;
    pub const ROOM_TEMP: u8 = 24;
    pub const FEED_TEMP: u8 = 25;
    pub const DHW_TEMP: u8 = 26;
    pub const OUTSIDE_TEMP: u8 = 27;
    pub const RETURN_WATER_TEMP: u8 = 28;
    pub const SOLAR_STORE_TEMP: u8 = 29;
    pub const SOLAR_COLLECT_TEMP: u8 = 30;
    pub const FEED_TEMP_CH2: u8 = 31;
    pub const DHW2_TEMP: u8 = 32;
    pub const EXHAUST_TEMP: u8 = 33;

    pub const DHW_BOUNDS: u8 = 48;
    pub const CH_BOUNDS: u8 = 49;
    pub const DHW_SETPOINT: u8 = 56;
    pub const MAX_CH_SETPOINT: u8 = 57;

    pub const OVERRIDE_FUNCTION: u8 = 100;

    pub const BURNER_STARTS: u8 = 116;
    pub const CH_PUMP_STARTS: u8 = 117;
    pub const DHW_PUMP_STARTS: u8 = 118;
    pub const DHW_BURNER_STARTS: u8 = 119;
    pub const BURNER_HOURS: u8 = 120;
    pub const CH_PUMP_HOURS: u8 = 121;
    pub const DHW_PUMP_HOURS: u8 = 122;
    pub const DHW_BURNER_HOURS: u8 = 123;
    pub const OT_VERSION_MASTER: u8 = 124;
    pub const OT_VERSION_SLAVE: u8 = 125;
    pub const VERSION_SLAVE: u8 = 127;
    pub const VERSION_MASTER: u8 = 128;
}
