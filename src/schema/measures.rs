//! IFC measures and simple value types
//!
//! Property facets name the expected type of a property value through
//! `dataType`. The table below lists the measure and simple value types that
//! can appear there, with the SI unit and symbol of each measure. Types
//! without a unit (labels, ratios, counts) carry empty unit fields.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// One IFC measure or simple value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureInfo {
    /// Short identifier (e.g. `Length`)
    pub id: &'static str,
    /// IFC type name (e.g. `IfcLengthMeasure`)
    pub ifc_measure: &'static str,
    /// Description
    pub description: &'static str,
    /// Unit name, empty when dimensionless
    pub unit: &'static str,
    /// Unit symbol, empty when dimensionless
    pub unit_symbol: &'static str,
}

impl MeasureInfo {
    /// Whether the type carries a unit
    pub fn has_unit(&self) -> bool {
        !self.unit_symbol.is_empty()
    }
}

/// (id, IFC type, description, unit, symbol)
type MeasureRow = (&'static str, &'static str, &'static str, &'static str, &'static str);

const MEASURE_ROWS: &[MeasureRow] = &[
    ("Length", "IfcLengthMeasure", "Length", "metre", "m"),
    ("PositiveLength", "IfcPositiveLengthMeasure", "Positive length", "metre", "m"),
    ("NonNegativeLength", "IfcNonNegativeLengthMeasure", "Non negative length", "metre", "m"),
    ("Area", "IfcAreaMeasure", "Area", "square metre", "m2"),
    ("Volume", "IfcVolumeMeasure", "Volume", "cubic metre", "m3"),
    ("Mass", "IfcMassMeasure", "Mass", "kilogram", "kg"),
    ("Time", "IfcTimeMeasure", "Time", "second", "s"),
    ("ThermodynamicTemperature", "IfcThermodynamicTemperatureMeasure", "Temperature", "kelvin", "K"),
    ("ElectricCurrent", "IfcElectricCurrentMeasure", "Electric current", "ampere", "A"),
    ("AmountOfSubstance", "IfcAmountOfSubstanceMeasure", "Amount of substance", "mole", "mol"),
    ("LuminousIntensity", "IfcLuminousIntensityMeasure", "Luminous intensity", "candela", "cd"),
    ("PlaneAngle", "IfcPlaneAngleMeasure", "Plane angle", "radian", "rad"),
    ("PositivePlaneAngle", "IfcPositivePlaneAngleMeasure", "Positive plane angle", "radian", "rad"),
    ("SolidAngle", "IfcSolidAngleMeasure", "Solid angle", "steradian", "sr"),
    ("MassDensity", "IfcMassDensityMeasure", "Mass density", "kilogram per cubic metre", "kg/m3"),
    ("Pressure", "IfcPressureMeasure", "Pressure", "pascal", "Pa"),
    ("Force", "IfcForceMeasure", "Force", "newton", "N"),
    ("Power", "IfcPowerMeasure", "Power", "watt", "W"),
    ("Energy", "IfcEnergyMeasure", "Energy", "joule", "J"),
    ("Frequency", "IfcFrequencyMeasure", "Frequency", "hertz", "Hz"),
    ("ElectricVoltage", "IfcElectricVoltageMeasure", "Electric voltage", "volt", "V"),
    ("ElectricResistance", "IfcElectricResistanceMeasure", "Electric resistance", "ohm", "Ω"),
    ("Illuminance", "IfcIlluminanceMeasure", "Illuminance", "lux", "lx"),
    ("LuminousFlux", "IfcLuminousFluxMeasure", "Luminous flux", "lumen", "lm"),
    (
        "ThermalTransmittance",
        "IfcThermalTransmittanceMeasure",
        "Thermal transmittance",
        "watt per square metre kelvin",
        "W/(m2·K)",
    ),
    (
        "ThermalConductivity",
        "IfcThermalConductivityMeasure",
        "Thermal conductivity",
        "watt per metre kelvin",
        "W/(m·K)",
    ),
    (
        "ThermalResistance",
        "IfcThermalResistanceMeasure",
        "Thermal resistance",
        "square metre kelvin per watt",
        "m2·K/W",
    ),
    ("VolumetricFlowRate", "IfcVolumetricFlowRateMeasure", "Volumetric flow rate", "cubic metre per second", "m3/s"),
    ("MassFlowRate", "IfcMassFlowRateMeasure", "Mass flow rate", "kilogram per second", "kg/s"),
    ("LinearVelocity", "IfcLinearVelocityMeasure", "Linear velocity", "metre per second", "m/s"),
    ("SoundPowerLevel", "IfcSoundPowerLevelMeasure", "Sound power level", "decibel", "dB"),
    ("Ratio", "IfcRatioMeasure", "Ratio", "", ""),
    ("PositiveRatio", "IfcPositiveRatioMeasure", "Positive ratio", "", ""),
    ("NormalisedRatio", "IfcNormalisedRatioMeasure", "Normalised ratio", "", ""),
    ("Count", "IfcCountMeasure", "Count", "", ""),
    ("Numeric", "IfcNumericMeasure", "Number", "", ""),
    ("Monetary", "IfcMonetaryMeasure", "Monetary amount", "", ""),
    ("Descriptive", "IfcDescriptiveMeasure", "Descriptive measure", "", ""),
    ("Label", "IfcLabel", "Label", "", ""),
    ("Text", "IfcText", "Text", "", ""),
    ("Identifier", "IfcIdentifier", "Identifier", "", ""),
    ("Boolean", "IfcBoolean", "Boolean", "", ""),
    ("Logical", "IfcLogical", "Logical", "", ""),
    ("Integer", "IfcInteger", "Integer", "", ""),
    ("PositiveInteger", "IfcPositiveInteger", "Positive integer", "", ""),
    ("Real", "IfcReal", "Real number", "", ""),
    ("Date", "IfcDate", "Date", "", ""),
    ("DateTime", "IfcDateTime", "Date and time", "", ""),
    ("TimeOfDay", "IfcTime", "Time of day", "", ""),
    ("Duration", "IfcDuration", "Duration", "", ""),
    ("TimeStamp", "IfcTimeStamp", "Time stamp", "", ""),
    ("UriReference", "IfcURIReference", "URI reference", "", ""),
];

lazy_static! {
    /// Measures keyed by IFC type name, in table order
    static ref MEASURES: IndexMap<&'static str, MeasureInfo> = MEASURE_ROWS
        .iter()
        .map(|&(id, ifc_measure, description, unit, unit_symbol)| {
            (
                ifc_measure,
                MeasureInfo {
                    id,
                    ifc_measure,
                    description,
                    unit,
                    unit_symbol,
                },
            )
        })
        .collect();

    /// First measure declaring each unit symbol
    static ref UNITS: HashMap<&'static str, &'static MeasureInfo> = {
        let mut units = HashMap::new();
        for info in MEASURES.values().filter(|m| m.has_unit()) {
            units.entry(info.unit_symbol).or_insert(info);
        }
        units
    };
}

/// Look up a measure by IFC type name, exact first and then ignoring case
pub fn measure(ifc_measure: &str) -> Option<&'static MeasureInfo> {
    MEASURES.get(ifc_measure).or_else(|| {
        MEASURES
            .values()
            .find(|m| m.ifc_measure.eq_ignore_ascii_case(ifc_measure))
    })
}

/// Look up a measure by its short identifier
pub fn measure_by_id(id: &str) -> Option<&'static MeasureInfo> {
    MEASURES.values().find(|m| m.id == id)
}

/// The measure a unit symbol belongs to
pub fn unit(symbol: &str) -> Option<&'static MeasureInfo> {
    UNITS.get(symbol).copied()
}

/// Every known measure in table order
pub fn measures() -> impl Iterator<Item = &'static MeasureInfo> {
    MEASURES.values()
}
