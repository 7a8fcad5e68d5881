//! Types that describe a single archive entry, and timestamp reconstruction

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::result::ZipError;

/// Metadata and reader state for the entry the driver is currently
/// positioned on. Public access goes through `ZipEntry`, which borrows this
/// so that values rewritten by a trailing data descriptor are visible after
/// the entry has been read.
pub(crate) struct EntryData {
    pub reader_version: u16,
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    /// Effective compressed size; promoted from the Zip64 extra or the data
    /// descriptor when the 32-bit header slot could not hold it.
    pub compressed_size64: u64,
    pub uncompressed_size64: u64,
    pub name: String,
    pub name_raw: Vec<u8>,
    pub extra: Vec<u8>,
    pub modified: OffsetDateTime,
    pub zip64: bool,

    // Reader state, owned here so the driver can drain an entry the caller
    // abandoned.
    pub opened: bool,
    pub eof: bool,
    pub err: Option<ZipError>,
}

impl EntryData {
    pub(crate) fn has_data_descriptor(&self) -> bool {
        self.flags & 0x8 != 0
    }

    pub(crate) fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// 1980-01-01T00:00:00Z, the zip epoch. Only reachable as a guard if field
/// normalization ever left the supported calendar range, which the 7-bit
/// year field cannot do.
pub(crate) fn zip_epoch() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(315_532_800).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Decodes the MS-DOS date/time fields (2-second granularity, no zone) into
/// a UTC timestamp. Out-of-range fields roll over instead of failing: month
/// 0 is December of the previous year, day 0 the last day of the previous
/// month, and oversized time fields carry upward, so the all-zero pattern
/// emitted by streaming writers decodes to 1979-11-30T00:00:00Z.
pub(crate) fn msdos_to_datetime(dos_date: u16, dos_time: u16) -> OffsetDateTime {
    // date bits 0-4: day of month; 5-8: month; 9-15: years since 1980
    let mut year = (dos_date >> 9) as i32 + 1980;
    let month0 = ((dos_date >> 5) & 0xf) as i32 - 1;
    let day = (dos_date & 0x1f) as i64;
    // time bits 0-4: second/2; 5-10: minute; 11-15: hour
    let hour = (dos_time >> 11) as i64;
    let minute = ((dos_time >> 5) & 0x3f) as i64;
    let second = ((dos_time & 0x1f) * 2) as i64;

    year += month0.div_euclid(12);
    let month = Month::try_from((month0.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    let Ok(first_of_month) = Date::from_calendar_date(year, month, 1) else {
        return zip_epoch();
    };
    PrimitiveDateTime::new(first_of_month, Time::MIDNIGHT).assume_utc()
        + Duration::days(day - 1)
        + Duration::hours(hour)
        + Duration::minutes(minute)
        + Duration::seconds(second)
}

/// Converts an NTFS timestamp (100ns ticks since 1601-01-01 UTC) into a
/// UTC timestamp.
pub(crate) fn ntfs_to_datetime(ticks: u64) -> Option<OffsetDateTime> {
    const TICKS_PER_SECOND: u64 = 10_000_000;
    // Seconds between 1601-01-01 and the Unix epoch.
    const EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

    let secs = (ticks / TICKS_PER_SECOND) as i64 - EPOCH_OFFSET_SECS;
    let nanos = (ticks % TICKS_PER_SECOND) as i64 * 100;
    OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .map(|ts| ts + Duration::nanoseconds(nanos))
}

/// Estimates a fixed timezone from the delta between the legacy MS-DOS
/// timestamp (local time) and an extended timestamp (UTC). The offset is
/// rounded to 15 minutes (e.g. Nepal at +5:45) and reset to zero outside
/// [-12h, +14h] (Baker Island to the Line Islands).
pub(crate) fn estimate_timezone(delta: Duration) -> UtcOffset {
    const QUARTER_HOUR: i64 = 15 * 60;
    const MIN_OFFSET: i64 = -12 * 3600;
    const MAX_OFFSET: i64 = 14 * 3600;

    let secs = delta.whole_seconds();
    let half = if secs >= 0 {
        QUARTER_HOUR / 2
    } else {
        -QUARTER_HOUR / 2
    };
    let mut rounded = (secs + half) / QUARTER_HOUR * QUARTER_HOUR;
    if !(MIN_OFFSET..=MAX_OFFSET).contains(&rounded) {
        rounded = 0;
    }
    UtcOffset::from_whole_seconds(rounded as i32).unwrap_or(UtcOffset::UTC)
}

/// Computes the effective modification time of an entry.
///
/// The MS-DOS fields are always the baseline. When an extra field supplied
/// an absolute timestamp, that value wins and the MS-DOS delta provides a
/// best-effort zone; if the MS-DOS fields were zero the extended time stays
/// in UTC, which lets callers detect that an extended timestamp was present.
pub(crate) fn resolve_modified(
    dos_date: u16,
    dos_time: u16,
    extended: Option<OffsetDateTime>,
) -> OffsetDateTime {
    let msdos = msdos_to_datetime(dos_date, dos_time);
    match extended {
        None => msdos,
        Some(ext) if dos_date == 0 && dos_time == 0 => ext,
        Some(ext) => ext.to_offset(estimate_timezone(msdos - ext)),
    }
}
