use binrw::{BinReaderExt, BinWrite};
use models::dirent::{DirEntry, FatTimestamp};
use models::geometry::DIR_ENTRY_SIZE;
use models::{FloppyError, NameMode};
use std::io::Cursor;

const RECORD_LEN: usize = DIR_ENTRY_SIZE as usize;

/// 단축 이름에 쓸 수 없는 ASCII 문자
const ILLEGAL_CHARS: &[u8] = b"\"*+,./:;<=>?[\\]|";

/// 임의의 파일 이름을 11바이트 8.3 필드로 변환한다.
///
/// 첫 번째 `.`에서 나누고 대문자로 바꾼 뒤 8 + 3으로 공백 패딩한다.
/// 공백은 버리고, 비ASCII / 제어 문자 / FAT 금지 문자는 `_`로 바꾼다.
/// [`NameMode::Truncate`]는 긴 부분을 자르고 [`NameMode::Strict`]는 거부한다.
pub fn to_short_name(raw: &str, mode: NameMode) -> Result<[u8; 11], FloppyError> {
    let (base, ext) = raw.split_once('.').unwrap_or((raw, ""));

    // 이름 첫 바이트가 공백이나 0x00이면 레코드가 깨지므로 두 모드 모두 거부
    if base.chars().all(|c| c == ' ') {
        return Err(FloppyError::InvalidName {
            name: raw.to_string(),
            reason: "empty base name".to_string(),
        });
    }

    if mode == NameMode::Strict {
        if !base.chars().chain(ext.chars()).all(is_legal) {
            return Err(FloppyError::InvalidName {
                name: raw.to_string(),
                reason: "only one dot and printable ASCII characters are allowed".to_string(),
            });
        }
        if base.len() > 8 || ext.len() > 3 {
            return Err(FloppyError::NameTooLong { name: raw.to_string() });
        }
    }

    let mut name = [b' '; 11];
    for (slot, c) in name[..8].iter_mut().zip(base.chars().filter(|&c| c != ' ')) {
        *slot = short_char(c);
    }
    for (slot, c) in name[8..].iter_mut().zip(ext.chars().filter(|&c| c != ' ')) {
        *slot = short_char(c);
    }
    Ok(name)
}

fn is_legal(c: char) -> bool {
    c.is_ascii_graphic() && !ILLEGAL_CHARS.contains(&(c as u8))
}

fn short_char(c: char) -> u8 {
    if is_legal(c) {
        c.to_ascii_uppercase() as u8
    } else {
        b'_'
    }
}

/// 새로 기록한 파일의 디렉토리 레코드
pub fn file_entry(
    raw_name: &str,
    len: usize,
    first_cluster: u16,
    stamp: FatTimestamp,
    mode: NameMode,
) -> Result<DirEntry, FloppyError> {
    let name = to_short_name(raw_name, mode)?;
    let size = u32::try_from(len).map_err(|_| FloppyError::FileTooLarge {
        name: raw_name.to_string(),
        len,
    })?;
    Ok(DirEntry::file(name, size, first_cluster, stamp))
}

pub fn encode_dir_entry(entry: &DirEntry) -> Result<[u8; RECORD_LEN], FloppyError> {
    let mut writer = Cursor::new([0u8; RECORD_LEN]);
    entry.write_le(&mut writer).map_err(|e| FloppyError::ParseError {
        structure: "directory entry".to_string(),
        details: e.to_string(),
    })?;
    Ok(writer.into_inner())
}

pub fn parse_dir_entry(data: &[u8]) -> Result<DirEntry, FloppyError> {
    let mut reader = Cursor::new(data);
    reader.read_le().map_err(|e| FloppyError::ParseError {
        structure: "directory entry".to_string(),
        details: e.to_string(),
    })
}

/// `region_bytes` 크기의 0으로 채운 영역에 레코드를 순서대로 배치한다.
pub fn encode_root_directory(
    entries: &[DirEntry],
    capacity: u16,
    region_bytes: usize,
) -> Result<Vec<u8>, FloppyError> {
    if entries.len() > capacity as usize || entries.len() * RECORD_LEN > region_bytes {
        return Err(FloppyError::RootDirectoryFull { capacity });
    }

    let mut region = vec![0u8; region_bytes];
    for (slot, entry) in region.chunks_exact_mut(RECORD_LEN).zip(entries) {
        slot.copy_from_slice(&encode_dir_entry(entry)?);
    }
    Ok(region)
}

/// 한 번도 쓰이지 않은 슬롯까지 읽고 삭제된 레코드는 건너뛴다.
pub fn decode_root_directory(region: &[u8]) -> Result<Vec<DirEntry>, FloppyError> {
    let mut entries = Vec::new();
    for record in region.chunks_exact(RECORD_LEN) {
        let entry = parse_dir_entry(record)?;
        if entry.name[0] == 0x00 {
            break;
        }
        if entry.is_free() {
            continue;
        }
        entries.push(entry);
    }
    Ok(entries)
}
