use binrw::binrw;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::FloppyError;

/// 이 도구가 쓰는 유일한 속성 (일반 파일)
pub const ATTR_ARCHIVE: u8 = 0x20;

/// 패킹된 FAT 날짜/시간 쌍
///
/// date: 15-9비트 1980년 기준 연도, 8-5 월, 4-0 일
/// time: 15-11비트 시, 10-5 분, 4-0 초 / 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatTimestamp {
    pub date: u16,
    pub time: u16,
}

impl FatTimestamp {
    pub fn from_datetime(dt: &NaiveDateTime) -> Result<Self, FloppyError> {
        let year = dt.year();
        if !(1980..=2107).contains(&year) {
            return Err(FloppyError::TimestampOutOfRange(dt.to_string()));
        }

        let date = ((year - 1980) as u16) << 9 | (dt.month() as u16) << 5 | dt.day() as u16;
        let time = (dt.hour() as u16) << 11 | (dt.minute() as u16) << 5 | (dt.second() / 2) as u16;
        Ok(Self { date, time })
    }

    /// 실제 달력 시각이 아닌 값이면 `None`
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let year = 1980 + (self.date >> 9) as i32;
        let month = ((self.date >> 5) & 0x0F) as u32;
        let day = (self.date & 0x1F) as u32;
        let hour = (self.time >> 11) as u32;
        let minute = ((self.time >> 5) & 0x3F) as u32;
        let second = ((self.time & 0x1F) * 2) as u32;

        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }
}

/// 32바이트 short-name 디렉토리 레코드
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; 11],
    pub attributes: u8,
    pub reserved: u8,
    pub create_time_fine: u8,
    pub create_time: u16,
    pub create_date: u16,
    pub access_date: u16,
    pub first_cluster_high: u16, // FAT32 전용
    pub write_time: u16,
    pub write_date: u16,
    pub first_cluster_low: u16,
    pub file_size: u32,
}

impl DirEntry {
    /// archive 속성 파일 레코드. 날짜 필드는 모두 `stamp`로 채운다.
    pub fn file(name: [u8; 11], file_size: u32, first_cluster: u16, stamp: FatTimestamp) -> Self {
        Self {
            name,
            attributes: ATTR_ARCHIVE,
            reserved: 0,
            create_time_fine: 0,
            create_time: stamp.time,
            create_date: stamp.date,
            access_date: stamp.date,
            first_cluster_high: 0,
            write_time: stamp.time,
            write_date: stamp.date,
            first_cluster_low: first_cluster,
            file_size,
        }
    }

    pub fn is_free(&self) -> bool {
        self.name[0] == 0x00 || self.name[0] == 0xE5
    }

    pub fn first_cluster(&self) -> u16 {
        self.first_cluster_low
    }

    pub fn modified(&self) -> FatTimestamp {
        FatTimestamp {
            date: self.write_date,
            time: self.write_time,
        }
    }

    /// "KERNEL  BIN" -> "KERNEL.BIN"
    pub fn display_name(&self) -> String {
        let base = String::from_utf8_lossy(&self.name[..8]).trim_end().to_string();
        let ext = String::from_utf8_lossy(&self.name[8..]).trim_end().to_string();
        if ext.is_empty() {
            base
        } else {
            format!("{}.{}", base, ext)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn packs_date_and_time() {
        let stamp = FatTimestamp::from_datetime(&at(2026, 1, 29, 14, 30, 7)).unwrap();
        assert_eq!(stamp.date, (46 << 9) | (1 << 5) | 29);
        assert_eq!(stamp.time, 14 * 2048 + 30 * 32 + 3);
        assert_eq!(stamp.to_datetime(), Some(at(2026, 1, 29, 14, 30, 6)));
    }

    #[test]
    fn epoch_packs_to_day_one() {
        let stamp = FatTimestamp::from_datetime(&at(1980, 1, 1, 0, 0, 0)).unwrap();
        assert_eq!(stamp, FatTimestamp { date: 0x0021, time: 0 });
    }

    #[test]
    fn rejects_years_outside_fat_range() {
        assert!(matches!(
            FatTimestamp::from_datetime(&at(1979, 12, 31, 23, 59, 59)),
            Err(FloppyError::TimestampOutOfRange(_))
        ));
        assert!(FatTimestamp::from_datetime(&at(2108, 1, 1, 0, 0, 0)).is_err());
    }

    #[test]
    fn display_name_joins_base_and_extension() {
        let stamp = FatTimestamp { date: 0x21, time: 0 };
        assert_eq!(DirEntry::file(*b"KERNEL  BIN", 0, 2, stamp).display_name(), "KERNEL.BIN");
        assert_eq!(DirEntry::file(*b"README     ", 0, 2, stamp).display_name(), "README");
    }
}
