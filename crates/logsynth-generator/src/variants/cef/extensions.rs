//! Built-in CEF extension catalog.
//!
//! Keys and long-form names follow the ArcSight Common Event Format
//! dictionary (versions 23 and 25) plus the Check Point Log Exporter
//! mapping. `catdt` is not in either dictionary but is common in practice.

use std::sync::LazyLock;

use crate::catalog::{AttributeDescriptor, Catalog};
use crate::values::http;
use crate::values::Pool;
use crate::values::ValueProducer::*;

/// The validated built-in catalog.
///
/// Built on first use. An inconsistent table is a defect in this file and
/// aborts the process.
pub static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::new(descriptors())
        .unwrap_or_else(|err| panic!("built-in CEF catalog is invalid: {err}"))
});

fn descriptors() -> Vec<AttributeDescriptor> {
    vec![
        AttributeDescriptor::new("agt", "agentAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("agentDnsDomain", "agentDnsDomain")
            .producing(Domain),
        AttributeDescriptor::new("ahost", "agentHostName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("aid", "agentId")
            .producing(Uuid),
        AttributeDescriptor::new("amac", "agentMacAddress")
            .producing(HardwareAddr),
        AttributeDescriptor::new("agentNtDomain", "agentNtDomain")
            .producing(Domain),
        AttributeDescriptor::new("art", "agentReceiptTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("atz", "agentTimeZone")
            .producing(Keyword(Pool::TimeZones)),
        AttributeDescriptor::new("agentTranslatedAddress", "agentTranslatedAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("agentTranslatedZoneExternalID", "agentTranslatedZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("agentTranslatedZoneURI", "agentTranslatedZoneURI")
            .producing(Url),
        AttributeDescriptor::new("at", "agentType")
            .producing(OneOf(&["local", "network"])),
        AttributeDescriptor::new("av", "agentVersion")
            .producing(IntRange { min: 0, max: 5 }),
        AttributeDescriptor::new("agentZoneExternalID", "agentZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("agentZoneURI", "agentZoneURI")
            .producing(Url),
        AttributeDescriptor::new("app", "applicationProtocol")
            .producing(OneOf(&["tcp", "TCP", "udp", "UDP", "sip", "SIP", "http", "HTTP"])),
        AttributeDescriptor::new("cnt", "baseEventCount")
            .producing(IntRange { min: 0, max: 1000 }),
        AttributeDescriptor::new("in", "bytesIn")
            .producing(IntRange { min: 0, max: 100000 }),
        AttributeDescriptor::new("out", "bytesOut")
            .producing(IntRange { min: 0, max: 100000 }),
        AttributeDescriptor::new("customerExternalID", "customerExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("customerURI", "customerURI")
            .producing(Url),
        AttributeDescriptor::new("dst", "destinationAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("destinationDnsDomain", "destinationDnsDomain")
            .producing(Domain),
        AttributeDescriptor::new("dlat", "destinationGeoLatitude")
            .producing(FloatRange { min: -90.0, max: 90.0 }),
        AttributeDescriptor::new("dlong", "destinationGeoLongitude")
            .producing(FloatRange { min: -180.0, max: 180.0 }),
        AttributeDescriptor::new("dhost", "destinationHostName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("dmac", "destinationMacAddress")
            .producing(HardwareAddr),
        AttributeDescriptor::new("dntdom", "destinationNtDomain")
            .producing(Domain),
        AttributeDescriptor::new("dpt", "destinationPort")
            .requires("dst")
            .producing(IntRange { min: 0, max: 65535 }),
        AttributeDescriptor::new("dpid", "destinationProcessId")
            .producing(IntRange { min: 0, max: 65535 }),
        AttributeDescriptor::new("dproc", "destinationProcessName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("destinationServiceName", "destinationServiceName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("destinationTranslatedAddress", "destinationTranslatedAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("destinationTranslatedPort", "destinationTranslatedPort")
            .producing(IntRange { min: 0, max: 65535 }),
        AttributeDescriptor::new("destinationTranslatedZoneExternalID", "destinationTranslatedZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("destinationTranslatedZoneURI", "destinationTranslatedZoneURI")
            .producing(Url),
        AttributeDescriptor::new("duid", "destinationUserId")
            .producing(Keyword(Pool::Users)),
        AttributeDescriptor::new("duser", "destinationUserName")
            .producing(Keyword(Pool::Users)),
        AttributeDescriptor::new("dpriv", "destinationUserPrivileges")
            .producing(Keyword(Pool::Privileges)),
        AttributeDescriptor::new("destinationZoneExternalID", "destinationZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("destinationZoneURI", "destinationZoneURI")
            .producing(Url),
        AttributeDescriptor::new("act", "deviceAction")
            .producing(Keyword(Pool::Actions)),
        AttributeDescriptor::new("dvc", "deviceAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("cfp1", "deviceCustomFloatingPoint1")
            .producing(FloatRange { min: 0.0, max: 100.0 }),
        AttributeDescriptor::new("cfp1Label", "deviceCustomFloatingPoint1Label")
            .requires("cfp1")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cfp2", "deviceCustomFloatingPoint2")
            .producing(FloatRange { min: 0.0, max: 100.0 }),
        AttributeDescriptor::new("cfp2Label", "deviceCustomFloatingPoint2Label")
            .requires("cfp2")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cfp3", "deviceCustomFloatingPoint3")
            .producing(FloatRange { min: 0.0, max: 100.0 }),
        AttributeDescriptor::new("cfp3Label", "deviceCustomFloatingPoint3Label")
            .requires("cfp3")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cfp4", "deviceCustomFloatingPoint4")
            .producing(FloatRange { min: 0.0, max: 100.0 }),
        AttributeDescriptor::new("cfp4Label", "deviceCustomFloatingPoint4Label")
            .requires("cfp4")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("deviceCustomDate1", "deviceCustomDate1")
            .producing(RecentMillis),
        AttributeDescriptor::new("deviceCustomDate1Label", "deviceCustomDate1Label")
            .requires("deviceCustomDate1")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("deviceCustomDate2", "deviceCustomDate2")
            .producing(RecentMillis),
        AttributeDescriptor::new("deviceCustomDate2Label", "deviceCustomDate2Label")
            .requires("deviceCustomDate2")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("c6a1", "deviceCustomIPv6Address1")
            .producing(Ipv6),
        AttributeDescriptor::new("c6a1Label", "deviceCustomIPv6Address1Label")
            .requires("c6a1")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("c6a2", "deviceCustomIPv6Address2")
            .producing(Ipv6),
        AttributeDescriptor::new("c6a2Label", "deviceCustomIPv6Address2Label")
            .requires("c6a2")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("c6a3", "deviceCustomIPv6Address3")
            .producing(Ipv6),
        AttributeDescriptor::new("c6a3Label", "deviceCustomIPv6Address3Label")
            .requires("c6a3")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("c6a4", "deviceCustomIPv6Address4")
            .producing(Ipv6),
        AttributeDescriptor::new("c6a4Label", "deviceCustomIPv6Address4Label")
            .requires("c6a4")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cn1", "deviceCustomNumber1")
            .producing(IntRange { min: 0, max: 1000 }),
        AttributeDescriptor::new("cn1Label", "deviceCustomNumber1Label")
            .requires("cn1")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cn2", "deviceCustomNumber2")
            .producing(IntRange { min: 0, max: 1000 }),
        AttributeDescriptor::new("cn2Label", "deviceCustomNumber2Label")
            .requires("cn2")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cn3", "deviceCustomNumber3")
            .producing(IntRange { min: 0, max: 1000 }),
        AttributeDescriptor::new("cn3Label", "deviceCustomNumber3Label")
            .requires("cn3")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs1", "deviceCustomString1")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs1Label", "deviceCustomString1Label")
            .requires("cs1")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs2", "deviceCustomString2")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs2Label", "deviceCustomString2Label")
            .requires("cs2")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs3", "deviceCustomString3")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs3Label", "deviceCustomString3Label")
            .requires("cs3")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs4", "deviceCustomString4")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs4Label", "deviceCustomString4Label")
            .requires("cs4")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs5", "deviceCustomString5")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs5Label", "deviceCustomString5Label")
            .requires("cs5")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs6", "deviceCustomString6")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("cs6Label", "deviceCustomString6Label")
            .requires("cs6")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("deviceDirection", "deviceDirection")
            .producing(IntRange { min: 0, max: 1 }),
        AttributeDescriptor::new("deviceDnsDomain", "deviceDnsDomain")
            .producing(Domain),
        AttributeDescriptor::new("cat", "deviceEventCategory"),
        AttributeDescriptor::new("deviceExternalId", "deviceExternalId")
            .producing(Uuid),
        AttributeDescriptor::new("deviceFacility", "deviceFacility")
            .producing(OneOf(&["auth", "authpriv", "cron", "daemon", "kern", "lpr", "mail", "mark", "news", "syslog", "user", "uucp", "local0", "local1", "local2", "local3", "local4", "local5", "local6", "local7"])),
        AttributeDescriptor::new("dvchost", "deviceHostName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("deviceInboundInterface", "deviceInboundInterface")
            .producing(Keyword(Pool::Interfaces)),
        AttributeDescriptor::new("dvcmac", "deviceMacAddress")
            .producing(HardwareAddr),
        AttributeDescriptor::new("deviceNtDomain", "deviceNtDomain")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("deviceOutboundInterface", "deviceOutboundInterface")
            .producing(Keyword(Pool::Interfaces)),
        AttributeDescriptor::new("devicePayloadId", "devicePayloadId")
            .producing(Uuid),
        AttributeDescriptor::new("dvcpid", "deviceProcessId")
            .producing(IntRange { min: 0, max: 65535 }),
        AttributeDescriptor::new("deviceProcessName", "deviceProcessName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("rt", "deviceReceiptTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("dtz", "deviceTimeZone")
            .requires("rt")
            .producing(Keyword(Pool::TimeZones)),
        AttributeDescriptor::new("deviceTranslatedAddress", "deviceTranslatedAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("deviceTranslatedZoneExternalID", "deviceTranslatedZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("deviceTranslatedZoneURI", "deviceTranslatedZoneURI")
            .producing(Url),
        AttributeDescriptor::new("deviceZoneExternalID", "deviceZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("deviceZoneURI", "deviceZoneURI")
            .producing(Url),
        AttributeDescriptor::new("end", "endTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("eventId", "eventId")
            .producing(IntRange { min: 0, max: 100000 }),
        AttributeDescriptor::new("outcome", "eventOutcome")
            .producing(OneOf(&["success", "failure"])),
        AttributeDescriptor::new("externalId", "externalId")
            .producing(Uuid),
        AttributeDescriptor::new("fileCreateTime", "fileCreateTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("fileHash", "fileHash")
            .producing(Hash { bytes: 16 }),
        AttributeDescriptor::new("fileId", "fileId")
            .producing(Uuid),
        AttributeDescriptor::new("fileModificationTime", "fileModificationTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("flexNumber1", "deviceFlexNumber1")
            .producing(IntRange { min: 0, max: 100000 }),
        AttributeDescriptor::new("flexNumber1Label", "deviceFlexNumber1Label")
            .requires("flexNumber1")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("flexNumber2", "deviceFlexNumber2")
            .producing(IntRange { min: 0, max: 100000 }),
        AttributeDescriptor::new("flexNumber2Label", "deviceFlexNumber2Label")
            .requires("flexNumber2")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("fname", "filename")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("filePath", "filePath"),
        AttributeDescriptor::new("filePermission", "filePermission"),
        AttributeDescriptor::new("fsize", "fileSize")
            .producing(IntRange { min: 0, max: 100000 }),
        AttributeDescriptor::new("fileType", "fileType")
            .producing(OneOf(&["directory", "regular", "pipe", "socket"])),
        AttributeDescriptor::new("flexDate1", "flexDate1")
            .producing(RecentMillis),
        AttributeDescriptor::new("flexDate1Label", "flexDate1Label")
            .requires("flexDate1"),
        AttributeDescriptor::new("flexString1", "flexString1"),
        AttributeDescriptor::new("flexString2", "flexString2"),
        AttributeDescriptor::new("flexString1Label", "flexString1Label")
            .requires("flexString1"),
        AttributeDescriptor::new("flexString2Label", "flexString2Label")
            .requires("flexString2"),
        AttributeDescriptor::new("msg", "message")
            .producing(Keyword(Pool::Messages)),
        AttributeDescriptor::new("oldFileCreateTime", "oldFileCreateTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("oldFileHash", "oldFileHash")
            .producing(Hash { bytes: 16 }),
        AttributeDescriptor::new("oldFileId", "oldFileId"),
        AttributeDescriptor::new("oldFileModificationTime", "oldFileModificationTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("oldFileName", "oldFileName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("oldFilePath", "oldFilePath"),
        AttributeDescriptor::new("oldFilePermission", "oldFilePermission"),
        AttributeDescriptor::new("oldFileSize", "oldFileSize")
            .producing(IntRange { min: 0, max: 100000 }),
        AttributeDescriptor::new("oldFileType", "oldFileType")
            .producing(OneOf(&["directory", "regular", "pipe", "socket"])),
        AttributeDescriptor::new("rawEvent", "rawEvent")
            .producing(Text { min_words: 1, max_words: 500 }),
        AttributeDescriptor::new("reason", "Reason")
            .producing(OneOf(&["bad password", "unknown user", "banned"])),
        AttributeDescriptor::new("requestClientApplication", "requestClientApplication")
            .producing(UserAgent),
        AttributeDescriptor::new("requestContext", "requestContext")
            .producing(Url),
        AttributeDescriptor::new("requestCookies", "requestCookies")
            .producing(Uuid),
        AttributeDescriptor::new("requestMethod", "requestMethod")
            .producing(OneOf(http::METHODS)),
        AttributeDescriptor::new("request", "requestUrl")
            .producing(Url),
        AttributeDescriptor::new("src", "sourceAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("sourceDnsDomain", "sourceDnsDomain")
            .producing(Domain),
        AttributeDescriptor::new("slat", "sourceGeoLatitude")
            .producing(FloatRange { min: -90.0, max: 90.0 }),
        AttributeDescriptor::new("slong", "sourceGeoLongitude")
            .producing(FloatRange { min: -180.0, max: 180.0 }),
        AttributeDescriptor::new("shost", "sourceHostName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("smac", "sourceMacAddress")
            .producing(HardwareAddr),
        AttributeDescriptor::new("sntdom", "sourceNtDomain")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("spt", "sourcePort")
            .producing(IntRange { min: 0, max: 65535 }),
        AttributeDescriptor::new("spid", "sourceProcessId")
            .producing(IntRange { min: 0, max: 65535 }),
        AttributeDescriptor::new("sproc", "sourceProcessName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("sourceServiceName", "sourceServiceName")
            .producing(Keyword(Pool::Words)),
        AttributeDescriptor::new("sourceTranslatedAddress", "sourceTranslatedAddress")
            .producing(Ipv4),
        AttributeDescriptor::new("sourceTranslatedPort", "sourceTranslatedPort")
            .producing(IntRange { min: 0, max: 65535 }),
        AttributeDescriptor::new("sourceTranslatedZoneExternalID", "sourceTranslatedZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("sourceTranslatedZoneURI", "sourceTranslatedZoneURI")
            .producing(Url),
        AttributeDescriptor::new("suid", "sourceUserId")
            .producing(Keyword(Pool::Users)),
        AttributeDescriptor::new("suser", "sourceUserName")
            .producing(Keyword(Pool::Users)),
        AttributeDescriptor::new("spriv", "sourceUserPrivileges")
            .producing(Keyword(Pool::Privileges)),
        AttributeDescriptor::new("sourceZoneExternalID", "sourceZoneExternalID")
            .producing(Uuid),
        AttributeDescriptor::new("sourceZoneURI", "sourceZoneURI")
            .producing(Url),
        AttributeDescriptor::new("start", "startTime")
            .producing(RecentMillis),
        AttributeDescriptor::new("proto", "transportProtocol")
            .producing(OneOf(&["tcp", "TCP", "udp", "UDP"])),
        AttributeDescriptor::new("type", "type")
            .producing(IntRange { min: 0, max: 15 }),
        AttributeDescriptor::new("catdt", "categoryDeviceType")
            .producing(OneOf(&["Operating system", "Network-based IDS/IPS"])),
        AttributeDescriptor::new("mrt", "managerReceiptTime")
            .producing(RecentMillis),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_builds() {
        assert_eq!(CATALOG.len(), 166);
        assert_eq!(CATALOG.selectable().len(), 155);
    }

    #[test]
    fn test_labels_point_at_their_value() {
        for abbrev in ["cs1Label", "cn3Label", "c6a4Label", "cfp2Label", "flexNumber1Label"] {
            let descriptor = CATALOG.get(abbrev).unwrap();
            let prerequisite = descriptor.prerequisite.as_deref().unwrap();
            assert_eq!(format!("{prerequisite}Label"), abbrev);
        }
    }

    #[test]
    fn test_port_chains() {
        let chain: Vec<&str> = CATALOG
            .chain("dpt")
            .iter()
            .map(|d| d.abbrev.as_str())
            .collect();
        assert_eq!(chain, vec!["dpt", "dst"]);

        let chain: Vec<&str> = CATALOG
            .chain("dtz")
            .iter()
            .map(|d| d.abbrev.as_str())
            .collect();
        assert_eq!(chain, vec!["dtz", "rt"]);
    }

    #[test]
    fn test_placeholders_are_not_selectable() {
        for abbrev in ["cat", "filePath", "flexString1", "oldFilePermission"] {
            assert!(CATALOG.contains(abbrev));
            assert!(!CATALOG.selectable().iter().any(|k| k == abbrev));
        }
    }
}
