//! Windows Security audit events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::values::network;

pub const PROVIDER_NAME: &str = "Microsoft-Windows-Security-Auditing";
pub const PROVIDER_GUID: &str = "{54849625-5478-4994-A5BA-3E3B0328C30D}";

const KEYWORDS_AUDIT_SUCCESS: u64 = 0x8020_0000_0000_0000;

/// Event IDs this generator knows how to build, in ascending order.
pub const EVENT_IDS: [u32; 6] = [4624, 4634, 4723, 4741, 4743, 4768];

/// One Security channel event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_id: u32,
    pub version: u8,
    pub level: u8,
    pub task: u16,
    pub opcode: u8,
    pub keywords: u64,
    pub time_created: DateTime<Utc>,
    pub record_id: u64,
    pub process_id: u32,
    pub thread_id: u32,
    pub channel: &'static str,
    pub computer: String,
    /// `EventData` entries, in document order
    pub data: Vec<(&'static str, String)>,
}

impl Event {
    fn random<R: Rng>(event_id: u32, now: DateTime<Utc>, computer: String, rng: &mut R) -> Self {
        Self {
            event_id,
            version: 0,
            level: 0,
            task: rng.gen(),
            opcode: 0,
            keywords: KEYWORDS_AUDIT_SUCCESS,
            time_created: now,
            record_id: rng.gen(),
            process_id: rng.gen_range(0..65536),
            thread_id: rng.gen_range(0..65536),
            channel: "Security",
            computer,
            data: Vec::new(),
        }
    }
}

/// SIDs handed out so far, so a name keeps its SID for the generator's
/// lifetime.
#[derive(Debug, Default)]
pub struct SidBook {
    users: HashMap<String, String>,
    services: HashMap<String, String>,
}

impl SidBook {
    pub fn user<R: Rng>(&mut self, name: &str, rng: &mut R) -> String {
        self.users
            .entry(name.to_string())
            .or_insert_with(|| random_sid(rng))
            .clone()
    }

    pub fn service<R: Rng>(&mut self, name: &str, rng: &mut R) -> String {
        self.services
            .entry(name.to_string())
            .or_insert_with(|| random_sid(rng))
            .clone()
    }
}

fn random_sid<R: Rng>(rng: &mut R) -> String {
    format!(
        "S-1-5-21-{}-{}-{}-{}",
        rng.gen::<u32>(),
        rng.gen::<u32>(),
        rng.gen::<u32>(),
        rng.gen_range(0..1u32 << 16)
    )
}

fn user<R: Rng>(rng: &mut R) -> String {
    format!("user{}", rng.gen_range(0..100u32))
}

fn domain<R: Rng>(rng: &mut R) -> String {
    format!("DOMAIN-{}", rng.gen_range(0..10u32))
}

fn computer_name<R: Rng>(rng: &mut R, domain: Option<&str>) -> String {
    let name = format!("COMPUTER-{}", rng.gen_range(0..1000u32));
    match domain {
        Some(domain) => format!("{name}.{domain}"),
        None => name,
    }
}

fn logon_id<R: Rng>(rng: &mut R) -> String {
    format!("{:#x}", rng.gen_range(0..65536u32))
}

/// Build a random event with the given ID, or `None` for an unknown ID.
pub fn build<R: Rng>(
    event_id: u32,
    now: DateTime<Utc>,
    sids: &mut SidBook,
    rng: &mut R,
) -> Option<Event> {
    let event = match event_id {
        4624 => logon(now, sids, rng),
        4634 => logoff(now, sids, rng),
        4723 => password_change(now, sids, rng),
        4741 => computer_created(now, sids, rng),
        4743 => computer_deleted(now, sids, rng),
        4768 => ticket_requested(now, sids, rng),
        _ => return None,
    };
    Some(event)
}

/// 4624: an account was successfully logged on.
fn logon<R: Rng>(now: DateTime<Utc>, sids: &mut SidBook, rng: &mut R) -> Event {
    let computer = computer_name(rng, None);
    let subject = format!("{computer}$");
    let target = user(rng);
    let mut event = Event::random(4624, now, computer.clone(), rng);

    event.data = vec![
        ("SubjectUserSid", "S-1-5-18".to_string()),
        ("SubjectUserName", subject),
        ("SubjectDomainName", "WORKGROUP".to_string()),
        ("SubjectLogonId", logon_id(rng)),
        ("TargetUserSid", sids.user(&target, rng)),
        ("TargetUserName", target),
        ("TargetDomainName", computer.clone()),
        ("TargetLogonId", logon_id(rng)),
        ("LogonType", "2".to_string()),
        ("LogonProcessName", "User32".to_string()),
        ("AuthenticationPackageName", "Negotiate".to_string()),
        ("WorkstationName", computer),
        (
            "LogonGuid",
            "{00000000-0000-0000-0000-000000000000}".to_string(),
        ),
        ("TransmittedServices", "-".to_string()),
        ("LmPackageName", "-".to_string()),
        ("KeyLength", "0".to_string()),
        ("ProcessId", logon_id(rng)),
        (
            "ProcessName",
            r"C:\Windows\System32\svchost.exe".to_string(),
        ),
        ("IpAddress", network::ipv4(rng).to_string()),
        ("IpPort", network::port(rng).to_string()),
        ("ImpersonationLevel", "%%1833".to_string()),
        ("RestrictedAdminMode", "-".to_string()),
        ("TargetOutboundUserName", "-".to_string()),
        ("TargetOutboundDomainName", "-".to_string()),
        ("VirtualAccount", "%%1843".to_string()),
        ("TargetLinkedLogonId", "0x0".to_string()),
        ("ElevatedToken", "%%1842".to_string()),
    ];
    event
}

/// 4634: an account was logged off.
fn logoff<R: Rng>(now: DateTime<Utc>, sids: &mut SidBook, rng: &mut R) -> Event {
    let domain = domain(rng);
    let computer = computer_name(rng, Some(&domain));
    let target = user(rng);
    let mut event = Event::random(4634, now, computer, rng);

    event.data = vec![
        ("TargetUserSid", sids.user(&target, rng)),
        ("TargetUserName", target),
        ("TargetDomainName", domain),
        ("TargetLogonId", logon_id(rng)),
        ("LogonType", "2".to_string()),
    ];
    event
}

/// 4723: an attempt was made to change an account's password.
fn password_change<R: Rng>(now: DateTime<Utc>, sids: &mut SidBook, rng: &mut R) -> Event {
    let domain = domain(rng);
    let computer = computer_name(rng, Some(&domain));
    let target = user(rng);
    let mut event = Event::random(4723, now, computer, rng);

    let sid = sids.user(&target, rng);
    event.data = vec![
        ("TargetUserName", target.clone()),
        ("TargetDomainName", domain.clone()),
        ("TargetSid", sid.clone()),
        ("SubjectUserSid", sid),
        ("SubjectUserName", target),
        ("SubjectDomainName", domain),
        ("SubjectLogonId", logon_id(rng)),
        ("PrivilegeList", "-".to_string()),
    ];
    event
}

/// 4741: a computer account was created.
fn computer_created<R: Rng>(now: DateTime<Utc>, sids: &mut SidBook, rng: &mut R) -> Event {
    let domain = domain(rng);
    let hostname = computer_name(rng, None);
    let computer = format!("{hostname}.{domain}");
    let target = format!("{hostname}$");
    let subject = user(rng);
    let mut event = Event::random(4741, now, computer.clone(), rng);

    event.data = vec![
        ("TargetUserSid", sids.user(&target, rng)),
        ("TargetUserName", target.clone()),
        ("TargetDomainName", domain.clone()),
        ("SubjectUserSid", sids.user(&subject, rng)),
        ("SubjectUserName", subject),
        ("SubjectDomainName", domain),
        ("SubjectLogonId", logon_id(rng)),
        ("PrivilegeList", "-".to_string()),
        ("SamAccountName", target),
        ("DisplayName", "-".to_string()),
        ("UserPrincipalName", "-".to_string()),
        ("HomeDirectory", "-".to_string()),
        ("HomePath", "-".to_string()),
        ("ScriptPath", "-".to_string()),
        ("ProfilePath", "-".to_string()),
        ("UserWorkstations", "-".to_string()),
        (
            "PasswordLastSet",
            now.format("%-m/%-d/%Y %I:%M:%S %p").to_string(),
        ),
        ("AccountExpires", "%%1794".to_string()),
        ("PrimaryGroupId", rng.gen_range(0..10_000u32).to_string()),
        ("AllowedToDelegateTo", "-".to_string()),
        ("OldUacValue", "0x0".to_string()),
        ("NewUacValue", "0x80".to_string()),
        ("UserAccountControl", "%%2087".to_string()),
        ("UserParameters", "-".to_string()),
        ("SidHistory", "-".to_string()),
        ("LogonHours", "%%1793".to_string()),
        ("DnsHostName", computer.clone()),
        (
            "ServicePrincipalNames",
            format!(
                "HOST/{computer} RestrictedKrbHost/{computer} HOST/{hostname} RestrictedKrbHost/{hostname}"
            ),
        ),
    ];
    event
}

/// 4743: a computer account was deleted.
fn computer_deleted<R: Rng>(now: DateTime<Utc>, sids: &mut SidBook, rng: &mut R) -> Event {
    let domain = domain(rng);
    let hostname = computer_name(rng, None);
    let computer = format!("{hostname}.{domain}");
    let target = format!("{hostname}$");
    let subject = user(rng);
    let mut event = Event::random(4743, now, computer, rng);

    event.data = vec![
        ("TargetUserSid", sids.user(&target, rng)),
        ("TargetUserName", target),
        ("TargetDomainName", domain.clone()),
        ("SubjectUserSid", sids.user(&subject, rng)),
        ("SubjectUserName", subject),
        ("SubjectDomainName", domain),
        ("SubjectLogonId", logon_id(rng)),
        ("PrivilegeList", "-".to_string()),
    ];
    event
}

/// 4768: a Kerberos authentication ticket (TGT) was requested.
fn ticket_requested<R: Rng>(now: DateTime<Utc>, sids: &mut SidBook, rng: &mut R) -> Event {
    let domain = domain(rng);
    let computer = computer_name(rng, Some(&domain));
    let target = user(rng);
    let mut event = Event::random(4768, now, computer, rng);

    event.data = vec![
        ("TargetUserName", target.clone()),
        ("TargetDomainName", domain.clone()),
        ("TargetSid", sids.user(&target, rng)),
        ("ServiceName", "krbtgt".to_string()),
        ("ServiceSid", sids.service("krbtgt", rng)),
        ("TicketOptions", "0x40810010".to_string()),
        ("TicketEncryptionType", "0x12".to_string()),
        ("PreAuthType", "15".to_string()),
        ("IpAddress", network::ipv4(rng).to_string()),
        ("IpPort", network::port(rng).to_string()),
        ("CertIssuerName", format!("{domain}-CA-1")),
        (
            "CertSerialNumber",
            "1D0000000D292FBE3C6CDDAFA200020000000D".to_string(),
        ),
        (
            "CertThumbprint",
            "564DFAEE99C71D62ABC553E695BD8DBC46669413".to_string(),
        ),
    ];
    event
}
