use time::{format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime};

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Local wall clock, falling back to UTC when the offset can't be determined.
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| now_utc())
}

pub fn iso(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_default()
}

/// `MM/DD/YYYY HH:MM:SS`, as shown in the banner.
pub fn stamp(dt: OffsetDateTime) -> String {
    dt.format(format_description!("[month]/[day]/[year] [hour]:[minute]:[second]"))
        .unwrap_or_default()
}

pub fn ser_age_iso<S: serde::Serializer>(d: &chrono::TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    // "PT...H...M...S" without days
    let secs = d.num_seconds().max(0);
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s_rem = secs % 60;
    s.serialize_str(&format!("PT{h}H{m}M{s_rem}S"))
}
