//! Windows Security event log records.
//!
//! ```yaml
//! generator:
//!   type: winlog
//!   event_id: 4768       # optional; random per record when omitted
//!   as_template: false   # emit event templates as JSON instead of XML
//! ```
//!
//! Records are `<Event>` documents indented by two spaces. With
//! `as_template` each record is instead a JSON object carrying the event
//! type, the event ID and the `EventData` values in order.
//!
//! A user or service name keeps the same SID for the lifetime of one
//! generator.

mod events;

use std::io::{Cursor, Write};

use chrono::SecondsFormat;
use quick_xml::events::{BytesStart, BytesText, Event as XmlEvent};
use quick_xml::Writer;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::generator::{parse_config, BuildContext, Clock, Generator, GeneratorError};

pub use events::{Event, SidBook, EVENT_IDS};

pub const NAME: &str = "winlog";

const EVENT_NAMESPACE: &str = "http://schemas.microsoft.com/win/2004/08/events/event";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WinlogConfig {
    /// Pin every record to one event ID
    pub event_id: Option<u32>,
    pub as_template: bool,
}

/// The message-template view of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTemplate {
    pub event_type: u16,
    pub event_id: u32,
    pub messages: Vec<String>,
}

impl From<&Event> for EventTemplate {
    fn from(event: &Event) -> Self {
        Self {
            event_type: u16::from(event.level),
            event_id: event.event_id,
            messages: event.data.iter().map(|(_, value)| value.clone()).collect(),
        }
    }
}

/// Windows event generator.
pub struct Winlog<R: Rng = StdRng> {
    event_id: Option<u32>,
    as_template: bool,
    sids: SidBook,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> Winlog<R> {
    pub fn new(config: WinlogConfig, rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        if let Some(id) = config.event_id {
            if !EVENT_IDS.contains(&id) {
                return Err(invalid_event_id(id));
            }
        }

        Ok(Self {
            event_id: config.event_id,
            as_template: config.as_template,
            sids: SidBook::default(),
            clock,
            rng,
        })
    }

    /// Draw the next event.
    pub fn randomize(&mut self) -> Result<Event, GeneratorError> {
        let id = match self.event_id {
            Some(id) => id,
            None => EVENT_IDS[self.rng.gen_range(0..EVENT_IDS.len())],
        };
        events::build(id, self.clock.now(), &mut self.sids, &mut self.rng)
            .ok_or_else(|| invalid_event_id(id))
    }
}

fn invalid_event_id(id: u32) -> GeneratorError {
    let ids: Vec<String> = EVENT_IDS.iter().map(u32::to_string).collect();
    GeneratorError::InvalidValue {
        field: "event_id",
        value: id.to_string(),
        expected: format!("one of [{}]", ids.join(" ")),
    }
}

impl<R: Rng + Send> Generator for Winlog<R> {
    fn next_record(&mut self) -> Result<Vec<u8>, GeneratorError> {
        let event = self.randomize()?;
        if self.as_template {
            return Ok(serde_json::to_vec(&EventTemplate::from(&event))?);
        }
        to_xml(&event)
    }
}

/// Render an event as an indented `<Event>` document.
pub fn to_xml(event: &Event) -> Result<Vec<u8>, GeneratorError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let mut root = BytesStart::new("Event");
    root.push_attribute(("xmlns", EVENT_NAMESPACE));
    writer.write_event(XmlEvent::Start(root))?;

    writer.write_event(XmlEvent::Start(BytesStart::new("System")))?;

    let mut provider = BytesStart::new("Provider");
    provider.push_attribute(("Name", events::PROVIDER_NAME));
    provider.push_attribute(("GUID", events::PROVIDER_GUID));
    writer.write_event(XmlEvent::Empty(provider))?;

    write_text(&mut writer, "EventID", &event.event_id.to_string())?;
    write_text(&mut writer, "Version", &event.version.to_string())?;
    write_text(&mut writer, "Level", &event.level.to_string())?;
    write_text(&mut writer, "Task", &event.task.to_string())?;
    write_text(&mut writer, "Opcode", &event.opcode.to_string())?;
    write_text(&mut writer, "Keywords", &format!("{:#x}", event.keywords))?;

    let mut time_created = BytesStart::new("TimeCreated");
    let system_time = event
        .time_created
        .to_rfc3339_opts(SecondsFormat::AutoSi, true);
    time_created.push_attribute(("SystemTime", system_time.as_str()));
    writer.write_event(XmlEvent::Empty(time_created))?;

    write_text(&mut writer, "EventRecordID", &event.record_id.to_string())?;
    writer.write_event(XmlEvent::Empty(BytesStart::new("Correlation")))?;

    let mut execution = BytesStart::new("Execution");
    execution.push_attribute(("ProcessID", event.process_id.to_string().as_str()));
    execution.push_attribute(("ThreadID", event.thread_id.to_string().as_str()));
    writer.write_event(XmlEvent::Empty(execution))?;

    write_text(&mut writer, "Channel", event.channel)?;
    write_text(&mut writer, "Computer", &event.computer)?;
    writer.write_event(XmlEvent::Empty(BytesStart::new("Security")))?;
    writer.write_event(XmlEvent::End(BytesStart::new("System").to_end()))?;

    writer.write_event(XmlEvent::Start(BytesStart::new("EventData")))?;
    for (name, value) in &event.data {
        let mut data = BytesStart::new("Data");
        data.push_attribute(("Name", *name));
        write_element(&mut writer, data, value)?;
    }
    writer.write_event(XmlEvent::End(BytesStart::new("EventData").to_end()))?;

    writer.write_event(XmlEvent::End(BytesStart::new("Event").to_end()))?;

    Ok(writer.into_inner().into_inner())
}

fn write_text<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    write_element(writer, BytesStart::new(name), text)
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), quick_xml::Error> {
    let end = start.to_end().into_owned();
    writer.write_event(XmlEvent::Start(start))?;
    writer.write_event(XmlEvent::Text(BytesText::new(text)))?;
    writer.write_event(XmlEvent::End(end))
}

pub fn construct(
    config: &serde_yaml::Value,
    ctx: BuildContext,
) -> Result<Box<dyn Generator>, GeneratorError> {
    let config: WinlogConfig = parse_config(config)?;
    Ok(Box::new(Winlog::new(config, ctx.rng, ctx.clock)?))
}
