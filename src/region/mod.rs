//! Prefecture classification of free-text addresses.
//!
//! An address is classified by scanning [`RegionCode::ALL`] in its canonical
//! order (north to south, JIS X 0401) and returning the first prefecture whose
//! full name occurs anywhere in the address. The order is part of the
//! contract: an address naming two prefectures resolves to whichever comes
//! first in the list, not whichever comes first in the text.

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::{collections::HashMap, fmt, str::FromStr};

/// One of the 47 prefectures of Japan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionCode {
    Hokkaido,
    Aomori,
    Iwate,
    Miyagi,
    Akita,
    Yamagata,
    Fukushima,
    Ibaraki,
    Tochigi,
    Gunma,
    Saitama,
    Chiba,
    Tokyo,
    Kanagawa,
    Niigata,
    Toyama,
    Ishikawa,
    Fukui,
    Yamanashi,
    Nagano,
    Gifu,
    Shizuoka,
    Aichi,
    Mie,
    Shiga,
    Kyoto,
    Osaka,
    Hyogo,
    Nara,
    Wakayama,
    Tottori,
    Shimane,
    Okayama,
    Hiroshima,
    Yamaguchi,
    Tokushima,
    Kagawa,
    Ehime,
    Kochi,
    Fukuoka,
    Saga,
    Nagasaki,
    Kumamoto,
    Oita,
    Miyazaki,
    Kagoshima,
    Okinawa,
}

impl RegionCode {
    /// Canonical scan order used by [`classify`].
    pub const ALL: [RegionCode; 47] = [
        RegionCode::Hokkaido,
        RegionCode::Aomori,
        RegionCode::Iwate,
        RegionCode::Miyagi,
        RegionCode::Akita,
        RegionCode::Yamagata,
        RegionCode::Fukushima,
        RegionCode::Ibaraki,
        RegionCode::Tochigi,
        RegionCode::Gunma,
        RegionCode::Saitama,
        RegionCode::Chiba,
        RegionCode::Tokyo,
        RegionCode::Kanagawa,
        RegionCode::Niigata,
        RegionCode::Toyama,
        RegionCode::Ishikawa,
        RegionCode::Fukui,
        RegionCode::Yamanashi,
        RegionCode::Nagano,
        RegionCode::Gifu,
        RegionCode::Shizuoka,
        RegionCode::Aichi,
        RegionCode::Mie,
        RegionCode::Shiga,
        RegionCode::Kyoto,
        RegionCode::Osaka,
        RegionCode::Hyogo,
        RegionCode::Nara,
        RegionCode::Wakayama,
        RegionCode::Tottori,
        RegionCode::Shimane,
        RegionCode::Okayama,
        RegionCode::Hiroshima,
        RegionCode::Yamaguchi,
        RegionCode::Tokushima,
        RegionCode::Kagawa,
        RegionCode::Ehime,
        RegionCode::Kochi,
        RegionCode::Fukuoka,
        RegionCode::Saga,
        RegionCode::Nagasaki,
        RegionCode::Kumamoto,
        RegionCode::Oita,
        RegionCode::Miyazaki,
        RegionCode::Kagoshima,
        RegionCode::Okinawa,
    ];

    /// 都道府県の正式名称
    pub fn name(&self) -> &'static str {
        match self {
            RegionCode::Hokkaido => "北海道",
            RegionCode::Aomori => "青森県",
            RegionCode::Iwate => "岩手県",
            RegionCode::Miyagi => "宮城県",
            RegionCode::Akita => "秋田県",
            RegionCode::Yamagata => "山形県",
            RegionCode::Fukushima => "福島県",
            RegionCode::Ibaraki => "茨城県",
            RegionCode::Tochigi => "栃木県",
            RegionCode::Gunma => "群馬県",
            RegionCode::Saitama => "埼玉県",
            RegionCode::Chiba => "千葉県",
            RegionCode::Tokyo => "東京都",
            RegionCode::Kanagawa => "神奈川県",
            RegionCode::Niigata => "新潟県",
            RegionCode::Toyama => "富山県",
            RegionCode::Ishikawa => "石川県",
            RegionCode::Fukui => "福井県",
            RegionCode::Yamanashi => "山梨県",
            RegionCode::Nagano => "長野県",
            RegionCode::Gifu => "岐阜県",
            RegionCode::Shizuoka => "静岡県",
            RegionCode::Aichi => "愛知県",
            RegionCode::Mie => "三重県",
            RegionCode::Shiga => "滋賀県",
            RegionCode::Kyoto => "京都府",
            RegionCode::Osaka => "大阪府",
            RegionCode::Hyogo => "兵庫県",
            RegionCode::Nara => "奈良県",
            RegionCode::Wakayama => "和歌山県",
            RegionCode::Tottori => "鳥取県",
            RegionCode::Shimane => "島根県",
            RegionCode::Okayama => "岡山県",
            RegionCode::Hiroshima => "広島県",
            RegionCode::Yamaguchi => "山口県",
            RegionCode::Tokushima => "徳島県",
            RegionCode::Kagawa => "香川県",
            RegionCode::Ehime => "愛媛県",
            RegionCode::Kochi => "高知県",
            RegionCode::Fukuoka => "福岡県",
            RegionCode::Saga => "佐賀県",
            RegionCode::Nagasaki => "長崎県",
            RegionCode::Kumamoto => "熊本県",
            RegionCode::Oita => "大分県",
            RegionCode::Miyazaki => "宮崎県",
            RegionCode::Kagoshima => "鹿児島県",
            RegionCode::Okinawa => "沖縄県",
        }
    }

    /// Position in [`RegionCode::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

static BY_NAME: Lazy<HashMap<&'static str, RegionCode>> = Lazy::new(|| {
    RegionCode::ALL
        .iter()
        .map(|code| (code.name(), *code))
        .collect()
});

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionCode {
    type Err = String;

    /// Exact match on the official name only; use [`classify`] for addresses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BY_NAME
            .get(s.trim())
            .copied()
            .ok_or_else(|| format!("unknown prefecture: {s}"))
    }
}

impl Serialize for RegionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Classify an address into its prefecture.
///
/// `None` for a missing or empty address, and for an address that names no
/// prefecture at all.
pub fn classify(address: Option<&str>) -> Option<RegionCode> {
    let address = address?;
    if address.is_empty() {
        return None;
    }
    RegionCode::ALL
        .iter()
        .find(|code| address.contains(code.name()))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_list_is_complete_and_ordered() {
        assert_eq!(RegionCode::ALL.len(), 47);
        assert_eq!(RegionCode::ALL[0], RegionCode::Hokkaido);
        assert_eq!(RegionCode::ALL[46], RegionCode::Okinawa);
        for (i, code) in RegionCode::ALL.iter().enumerate() {
            assert_eq!(code.index(), i);
        }
        assert_eq!(BY_NAME.len(), 47);
    }

    #[test]
    fn classifies_single_prefecture() {
        for code in RegionCode::ALL {
            let address = format!("〒000-0000 {}どこか町1-2-3", code.name());
            assert_eq!(classify(Some(address.as_str())), Some(code), "{}", address);
        }
        assert_eq!(classify(Some("東京都渋谷区1-1-1")), Some(RegionCode::Tokyo));
        assert_eq!(classify(Some("神奈川県横浜市")), Some(RegionCode::Kanagawa));
    }

    #[test]
    fn first_in_canonical_order_wins() {
        // 大阪府 precedes 沖縄県 in the scan order even though 沖縄県 comes first in the text
        assert_eq!(
            classify(Some("沖縄県那覇市 (勤務先: 大阪府大阪市)")),
            Some(RegionCode::Osaka)
        );
        assert_eq!(
            classify(Some("京都府から東京都へ転居")),
            Some(RegionCode::Tokyo)
        );
    }

    #[test]
    fn missing_or_unmatched_is_none() {
        assert_eq!(classify(None), None);
        assert_eq!(classify(Some("")), None);
        assert_eq!(classify(Some("no match here")), None);
        assert_eq!(classify(Some("unknown city")), None);
        // abbreviated names are not expanded
        assert_eq!(classify(Some("東京渋谷")), None);
    }

    #[test]
    fn parses_and_displays_official_names() {
        assert_eq!("鹿児島県".parse::<RegionCode>(), Ok(RegionCode::Kagoshima));
        assert!("鹿児島".parse::<RegionCode>().is_err());
        assert_eq!(RegionCode::Kyoto.to_string(), "京都府");
        assert_eq!(
            serde_json::to_string(&RegionCode::Hokkaido).unwrap(),
            "\"北海道\""
        );
    }
}
