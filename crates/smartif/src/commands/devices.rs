//! Per-kind device listings.

use serde::Serialize;
use tabled::Tabled;

use smartif_api::{
    BinarySensorInfo, ClimateInfo, CoverInfo, DeviceKind, EntityInfo, LightInfo, SmartIfClient,
    SwitchInfo,
};

use crate::cli::{DeviceKindArg, DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// One listed entity, flattened across the per-kind descriptor shapes.
#[derive(Debug, Serialize)]
struct DeviceSummary {
    id: String,
    name: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_class: Option<String>,
    features: Vec<&'static str>,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Features")]
    features: String,
}

impl From<&DeviceSummary> for DeviceRow {
    fn from(d: &DeviceSummary) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            class: d.device_class.clone().unwrap_or_default(),
            features: d.features.join(", "),
        }
    }
}

impl DeviceSummary {
    fn new(kind: DeviceKind, id: String, name: String) -> Self {
        Self {
            id,
            name,
            kind: kind.to_string(),
            device_class: None,
            features: Vec::new(),
        }
    }

    fn feature(mut self, supported: bool, name: &'static str) -> Self {
        if supported {
            self.features.push(name);
        }
        self
    }

    fn class(mut self, class: String) -> Self {
        self.device_class = Some(class);
        self
    }
}

fn from_entity(kind: DeviceKind, e: EntityInfo) -> DeviceSummary {
    DeviceSummary::new(kind, e.id, e.name)
}

fn from_light(l: LightInfo) -> DeviceSummary {
    DeviceSummary::new(DeviceKind::Light, l.id, l.name).feature(l.supports_brightness, "brightness")
}

fn from_cover(c: CoverInfo) -> DeviceSummary {
    DeviceSummary::new(DeviceKind::Cover, c.id, c.name)
        .class(c.device_class)
        .feature(c.supports_set_position, "position")
        .feature(c.supports_stop, "stop")
        .feature(c.supports_close, "close")
}

fn from_climate(c: ClimateInfo) -> DeviceSummary {
    DeviceSummary::new(DeviceKind::Climate, c.id, c.name).feature(c.supports_state, "state")
}

fn from_switch(s: SwitchInfo) -> DeviceSummary {
    DeviceSummary::new(DeviceKind::Switch, s.id, s.name).class(s.device_class)
}

fn from_binary_sensor(b: BinarySensorInfo) -> DeviceSummary {
    DeviceSummary::new(DeviceKind::BinarySensor, b.id, b.name).class(b.device_class)
}

pub async fn handle(
    args: DevicesArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices: Vec<DeviceSummary> = match args.kind {
        DeviceKindArg::Lights => client.list_lights().await?.into_iter().map(from_light).collect(),
        DeviceKindArg::Covers => client.list_covers().await?.into_iter().map(from_cover).collect(),
        DeviceKindArg::Climates => client
            .list_climates()
            .await?
            .into_iter()
            .map(from_climate)
            .collect(),
        DeviceKindArg::Switches => client
            .list_switches()
            .await?
            .into_iter()
            .map(from_switch)
            .collect(),
        DeviceKindArg::Sirens => client
            .list_sirens()
            .await?
            .into_iter()
            .map(|e| from_entity(DeviceKind::Siren, e))
            .collect(),
        DeviceKindArg::Alarms => client
            .list_alarm_panels()
            .await?
            .into_iter()
            .map(|e| from_entity(DeviceKind::AlarmControlPanel, e))
            .collect(),
        DeviceKindArg::BinarySensors => client
            .list_binary_sensors()
            .await?
            .into_iter()
            .map(from_binary_sensor)
            .collect(),
        DeviceKindArg::Cameras => client
            .list_cameras()
            .await?
            .into_iter()
            .map(|e| from_entity(DeviceKind::Camera, e))
            .collect(),
    };

    let out = output::render_list(
        global.output,
        &devices,
        |d| DeviceRow::from(d),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
