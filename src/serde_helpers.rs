use rgb::RGB8;
use serde::de::{self, Deserialize, Deserializer};

/// `None` if a part is not a number or if the time does not fit in a `u32`
pub fn parse_time_impl(h: &str, m: &str, s: &str) -> Option<u32> {
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    let seconds: u32 = s.parse().ok()?;
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Parses a GTFS time `HH:MM:SS` into seconds since midnight.
///
/// Hours may go beyond 24 for trips running after midnight.
pub fn parse_time(s: &str) -> Result<u32, crate::Error> {
    let mk_err = || crate::Error::InvalidTime(s.to_owned());

    if s.len() < 7 {
        Err(mk_err())
    } else {
        let mut parts = s.split(':');

        let hour = parts.next().ok_or_else(mk_err)?;
        let min = parts.next().ok_or_else(mk_err)?;
        let sec = parts.next().ok_or_else(mk_err)?;
        if parts.next().is_some() {
            return Err(mk_err());
        }

        if min.len() != 2 || sec.len() != 2 {
            return Err(mk_err());
        }

        parse_time_impl(hour, min, sec).ok_or_else(mk_err)
    }
}

/// Times that are empty or malformed become `None`
pub fn deserialize_optional_time<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<&str> = Deserialize::deserialize(deserializer)?;

    Ok(s.and_then(|t| parse_time(t).ok()))
}

/// Coordinates that are empty or not numbers become `None`: such stops are kept but never drawn
pub fn de_with_optional_float<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(|s| {
        s.and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite())
    })
}

pub fn de_with_trimed_float<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).and_then(|s| s.trim().parse().map_err(de::Error::custom))
}

/// Parses a color written as `RRGGBB`, with or without a leading `#`
pub fn parse_color(s: &str) -> Result<RGB8, crate::Error> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(crate::Error::InvalidColor(s.to_owned()));
    }
    let component = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| crate::Error::InvalidColor(s.to_owned()))
    };
    Ok(RGB8::new(component(0..2)?, component(2..4)?, component(4..6)?))
}

/// Formats a color the way map clients expect it, `#rrggbb`
pub fn format_color(color: RGB8) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

pub fn deserialize_option_color<'de, D>(de: D) -> Result<Option<RGB8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(de)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(c) => parse_color(c).map(Some).map_err(de::Error::custom),
    }
}

pub fn de_with_empty_default<'de, T, D>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(de).map(|opt| opt.unwrap_or_default())
}

#[test]
fn test_deserialize_time() {
    #[derive(Deserialize)]
    struct Test {
        #[serde(deserialize_with = "deserialize_optional_time", default)]
        time: Option<u32>,
    }
    let data_in = "time\n01:01:01\n";
    let parsed: Test = csv::Reader::from_reader(data_in.as_bytes())
        .deserialize()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(Some(3600 + 60 + 1), parsed.time);

    let data_in_long_ride = "time\n25:35:42\n";
    let parsed_long_ride: Test = csv::Reader::from_reader(data_in_long_ride.as_bytes())
        .deserialize()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(Some((25 * 3600) + (35 * 60) + 42), parsed_long_ride.time);

    assert!(parse_time("1:1:1").is_err());
    assert!(parse_time("10:00:00:00").is_err());
    // the hours fit in a u32 but not once converted to seconds
    assert!(matches!(
        parse_time("4294967:00:00"),
        Err(crate::Error::InvalidTime(_))
    ));
    assert_eq!(None, parse_time_impl("1193046", "28", "16"));
    assert_eq!(Some(u32::MAX), parse_time_impl("1193046", "28", "15"));

    let data_in_bad = "time\n4294967:00:00\n6:5:00\n";
    let parsed_bad: Vec<Test> = csv::Reader::from_reader(data_in_bad.as_bytes())
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(None, parsed_bad[0].time);
    assert_eq!(None, parsed_bad[1].time);
}

#[test]
fn test_parse_color() {
    assert_eq!(RGB8::new(0x25, 0x63, 0xeb), parse_color("#2563eb").unwrap());
    assert_eq!(RGB8::new(0xff, 0, 0), parse_color("FF0000").unwrap());
    assert!(parse_color("#fff").is_err());
    assert!(parse_color("zzzzzz").is_err());
    assert_eq!("#2563eb", format_color(RGB8::new(0x25, 0x63, 0xeb)));
}
