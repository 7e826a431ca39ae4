//! 12비트 FAT 엔트리 패킹
//!
//! 연속된 두 엔트리가 3바이트를 공유한다:
//!
//! ```text
//! byte0 = e0[7:0]
//! byte1 = e1[3:0] << 4 | e0[11:8]
//! byte2 = e1[11:4]
//! ```
//!
//! 홀수 개일 때 마지막 엔트리는 슬롯의 앞 2바이트(하위 바이트, 상위 니블)를 쓴다.

use models::fat::FAT12_MASK;
use models::FloppyError;

/// 엔트리 `count`개를 패킹하는 데 필요한 바이트 수
pub fn packed_len(count: usize) -> usize {
    (count * 3).div_ceil(2)
}

/// `entries`를 정확히 `table_bytes` 크기의 0으로 채운 테이블에 패킹한다.
/// 12비트를 넘는 값은 마스킹된다.
pub fn encode_entries(entries: &[u16], table_bytes: usize) -> Result<Vec<u8>, FloppyError> {
    let needed = packed_len(entries.len());
    if needed > table_bytes {
        return Err(FloppyError::FatOverflow {
            needed,
            capacity: table_bytes,
        });
    }

    let mut table = vec![0u8; table_bytes];
    for (index, &value) in entries.iter().enumerate() {
        write_entry(&mut table, index, value)?;
    }

    Ok(table)
}

/// 패킹된 테이블의 엔트리 하나를 덮어쓴다. 같은 바이트를 공유하는
/// 이웃 엔트리의 니블은 그대로 둔다.
pub fn write_entry(table: &mut [u8], index: usize, value: u16) -> Result<(), FloppyError> {
    let needed = packed_len(index + 1);
    if needed > table.len() {
        return Err(FloppyError::FatOverflow {
            needed,
            capacity: table.len(),
        });
    }

    let value = value & FAT12_MASK;
    let off = index * 3 / 2;
    if index % 2 == 0 {
        table[off] = (value & 0xFF) as u8;
        table[off + 1] = (table[off + 1] & 0xF0) | (value >> 8) as u8;
    } else {
        table[off] = (table[off] & 0x0F) | ((value & 0x0F) << 4) as u8;
        table[off + 1] = (value >> 4) as u8;
    }
    Ok(())
}

/// 패킹된 테이블에서 앞쪽 `count`개 엔트리를 풀어낸다.
pub fn decode_entries(table: &[u8], count: usize) -> Result<Vec<u16>, FloppyError> {
    let needed = packed_len(count);
    if needed > table.len() {
        return Err(FloppyError::parse(
            "FAT12 table",
            format!("{} entries need {} bytes, table has {}", count, needed, table.len()),
        ));
    }

    Ok((0..count).map(|index| unpack(table, index)).collect())
}

/// 패킹된 테이블에서 엔트리 하나를 바로 읽는다.
pub fn read_entry(table: &[u8], index: usize) -> Option<u16> {
    if packed_len(index + 1) > table.len() {
        return None;
    }
    Some(unpack(table, index))
}

fn unpack(table: &[u8], index: usize) -> u16 {
    let off = index * 3 / 2;
    let lo = table[off] as u16;
    let hi = table[off + 1] as u16;
    if index % 2 == 0 {
        lo | (hi & 0x0F) << 8
    } else {
        lo >> 4 | hi << 4
    }
}
