//! Transmitter state
//!
//! Antenna height, orientation, power and the propagation parameters
//! derived from the selected frequency band and antenna type. Mutated only
//! through the setters below.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::direction_from_degrees;

/// Frequency bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyBand {
    Hf,
    Vhf,
    Uhf,
    Shf,
}

impl FrequencyBand {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HF" => Some(FrequencyBand::Hf),
            "VHF" => Some(FrequencyBand::Vhf),
            "UHF" => Some(FrequencyBand::Uhf),
            "SHF" => Some(FrequencyBand::Shf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyBand::Hf => "HF",
            FrequencyBand::Vhf => "VHF",
            FrequencyBand::Uhf => "UHF",
            FrequencyBand::Shf => "SHF",
        }
    }

    /// Higher bands propagate faster
    pub fn propagation_speed(&self) -> f32 {
        match self {
            FrequencyBand::Hf => 1.0,
            FrequencyBand::Vhf => 2.0,
            FrequencyBand::Uhf => 3.0,
            FrequencyBand::Shf => 4.0,
        }
    }
}

/// Antenna types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntennaType {
    Dish,
    Yagi,
    Dipole,
}

impl AntennaType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dish" => Some(AntennaType::Dish),
            "yagi" => Some(AntennaType::Yagi),
            "dipole" => Some(AntennaType::Dipole),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AntennaType::Dish => "dish",
            AntennaType::Yagi => "yagi",
            AntennaType::Dipole => "dipole",
        }
    }

    /// Beam half-angle in degrees
    pub fn beam_half_angle(&self) -> f32 {
        match self {
            AntennaType::Dish => 10.0,
            AntennaType::Yagi => 45.0,
            AntennaType::Dipole => 360.0,
        }
    }

    pub fn propagation_speed(&self) -> f32 {
        match self {
            AntennaType::Dish => 30.0,
            AntennaType::Yagi => 20.0,
            AntennaType::Dipole => 10.0,
        }
    }
}

/// Current transmitter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionState {
    pub antenna_height: i32,
    /// Raw power as set; clamped into range when a wave is emitted
    pub transmit_power: i32,
    pub orientation_degrees: i32,
    /// Unit vector derived from `orientation_degrees`
    pub transmit_direction: Vec2,
    /// Degrees
    pub beam_half_angle: f32,
    pub propagation_speed: f32,
    pub frequency_band: Option<FrequencyBand>,
    pub antenna_type: Option<AntennaType>,
    pub player_position: Vec2,
    /// Always `player_position - (0, antenna_height * ANTENNA_HEIGHT_SCALE)`
    pub transmit_position: Vec2,
}

impl Default for TransmissionState {
    fn default() -> Self {
        let (x, y) = DEFAULT_PLAYER_POSITION;
        let mut state = Self {
            antenna_height: DEFAULT_ANTENNA_HEIGHT,
            transmit_power: MIN_TRANSMIT_POWER,
            orientation_degrees: 0,
            transmit_direction: direction_from_degrees(0.0),
            beam_half_angle: DEFAULT_BEAM_HALF_ANGLE,
            propagation_speed: DEFAULT_PROPAGATION_SPEED,
            frequency_band: None,
            antenna_type: None,
            player_position: Vec2::new(x, y),
            transmit_position: Vec2::ZERO,
        };
        state.update_transmit_position();
        state
    }
}

impl TransmissionState {
    pub fn set_antenna_height(&mut self, height: i32) {
        self.antenna_height = height;
        self.update_transmit_position();
        log::debug!("Antenna height {} -> transmit at {}", height, self.transmit_position);
    }

    /// Stored as given; see [`TransmissionState::clamp_power`]
    pub fn set_transmit_power(&mut self, power: i32) {
        self.transmit_power = power;
    }

    /// Unknown names leave the state untouched
    pub fn set_frequency_band(&mut self, name: &str) {
        match FrequencyBand::from_name(name) {
            Some(band) => {
                self.frequency_band = Some(band);
                self.propagation_speed = band.propagation_speed();
                log::debug!("Frequency band {} -> speed {}", name, self.propagation_speed);
            }
            None => log::debug!("Ignoring unknown frequency band {:?}", name),
        }
    }

    /// Unknown names leave the state untouched.
    ///
    /// Also overwrites `propagation_speed`; whichever of this and
    /// [`TransmissionState::set_frequency_band`] runs last wins.
    pub fn set_antenna_type(&mut self, name: &str) {
        match AntennaType::from_name(name) {
            Some(antenna) => {
                self.antenna_type = Some(antenna);
                self.beam_half_angle = antenna.beam_half_angle();
                self.propagation_speed = antenna.propagation_speed();
                log::debug!(
                    "Antenna {} -> beam {}°, speed {}",
                    name,
                    self.beam_half_angle,
                    self.propagation_speed
                );
            }
            None => log::debug!("Ignoring unknown antenna type {:?}", name),
        }
    }

    /// Clamped to [-90, 90]; 0 is straight up, positive tilts right
    pub fn set_antenna_orientation(&mut self, degrees: i32) {
        self.orientation_degrees = degrees.clamp(-90, 90);
        self.transmit_direction = direction_from_degrees(self.orientation_degrees as f32);
    }

    pub fn set_player_position(&mut self, position: Vec2) {
        self.player_position = position;
        self.update_transmit_position();
    }

    /// Clamp the stored power into [MIN, MAX] in place and return it
    pub fn clamp_power(&mut self) -> i32 {
        self.transmit_power = self
            .transmit_power
            .clamp(MIN_TRANSMIT_POWER, MAX_TRANSMIT_POWER);
        self.transmit_power
    }

    fn update_transmit_position(&mut self) {
        self.transmit_position = self.player_position
            - Vec2::new(0.0, self.antenna_height as f32 * ANTENNA_HEIGHT_SCALE);
    }
}
