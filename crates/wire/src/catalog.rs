//! Display names for F1 22 id fields.

/// Track name for `m_trackId`.
pub fn track_name(track_id: i8) -> &'static str {
    match track_id {
        0 => "Melbourne",
        1 => "Paul Ricard",
        2 => "Shanghai",
        3 => "Sakhir (Bahrain)",
        4 => "Catalunya",
        5 => "Monaco",
        6 => "Montreal",
        7 => "Silverstone",
        8 => "Hockenheim",
        9 => "Hungaroring",
        10 => "Spa",
        11 => "Monza",
        12 => "Singapore",
        13 => "Suzuka",
        14 => "Abu Dhabi",
        15 => "Texas",
        16 => "Brazil",
        17 => "Austria",
        18 => "Sochi",
        19 => "Mexico",
        20 => "Baku (Azerbaijan)",
        21 => "Sakhir Short",
        22 => "Silverstone Short",
        23 => "Texas Short",
        24 => "Suzuka Short",
        25 => "Hanoi",
        26 => "Zandvoort",
        27 => "Imola",
        28 => "Portimão",
        29 => "Jeddah",
        30 => "Miami",
        _ => "Unknown",
    }
}

/// Short label for `m_sessionType`.
pub fn session_type_label(session_type: u8) -> &'static str {
    match session_type {
        1 => "P1",
        2 => "P2",
        3 => "P3",
        4 => "Short P",
        5 => "Q1",
        6 => "Q2",
        7 => "Q3",
        8 => "Short Q",
        9 => "OSQ",
        10 => "R",
        11 => "R2",
        12 => "R3",
        13 => "Time Trial",
        _ => "Unknown",
    }
}

pub fn weather_label(weather: u8) -> &'static str {
    match weather {
        0 => "Clear",
        1 => "Light Cloud",
        2 => "Overcast",
        3 => "Light Rain",
        4 => "Heavy Rain",
        5 => "Storm",
        _ => "Unknown",
    }
}

/// Team (or car) name for `m_teamId`. Covers the F1, F2 and supercar ids.
pub fn team_name(team_id: u8) -> &'static str {
    match team_id {
        0 => "Mercedes",
        1 => "Ferrari",
        2 => "Red Bull Racing",
        3 => "Williams",
        4 => "Aston Martin",
        5 => "Alpine",
        6 => "Alpha Tauri",
        7 => "Haas",
        8 => "McLaren",
        9 => "Alfa Romeo",
        85 => "Mercedes 2020",
        86 => "Ferrari 2020",
        87 => "Red Bull 2020",
        88 => "Williams 2020",
        89 => "Racing Point 2020",
        90 => "Renault 2020",
        91 => "Alpha Tauri 2020",
        92 => "Haas 2020",
        93 => "McLaren 2020",
        94 => "Alfa Romeo 2020",
        95 => "Aston Martin DB11 V12",
        96 => "Aston Martin Vantage F1 Edition",
        97 => "Aston Martin Vantage Safety Car",
        98 => "Ferrari F8 Tributo",
        99 => "Ferrari Roma",
        100 => "McLaren 720S",
        101 => "McLaren Artura",
        102 => "Mercedes AMG GT Black Series Safety Car",
        103 => "Mercedes AMG GTR Pro",
        104 => "F1 Custom Team",
        106 => "Prema '21",
        107 => "Uni-Virtuosi '21",
        108 => "Carlin '21",
        109 => "Hitech '21",
        110 => "Art GP '21",
        111 => "MP Motorsport '21",
        112 => "Charouz '21",
        113 => "Dams '21",
        114 => "Campos '21",
        115 => "BWT '21",
        116 => "Trident '21",
        117 => "Mercedes AMG GT Black Series",
        118 => "Prema '22",
        119 => "Virtuosi '22",
        120 => "Carlin '22",
        121 => "Hitech '22",
        122 => "Art GP '22",
        123 => "MP Motorsport '22",
        124 => "Charouz '22",
        125 => "Dams '22",
        126 => "Campos '22",
        127 => "Van Amersfoort Racing '22",
        128 => "Trident '22",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve() {
        assert_eq!(track_name(7), "Silverstone");
        assert_eq!(track_name(30), "Miami");
        assert_eq!(session_type_label(10), "R");
        assert_eq!(weather_label(4), "Heavy Rain");
        assert_eq!(team_name(8), "McLaren");
        assert_eq!(team_name(128), "Trident '22");
    }

    #[test]
    fn unknown_ids_fall_back() {
        assert_eq!(track_name(-1), "Unknown");
        assert_eq!(track_name(99), "Unknown");
        assert_eq!(session_type_label(0), "Unknown");
        assert_eq!(weather_label(6), "Unknown");
        assert_eq!(team_name(105), "Unknown");
        assert_eq!(team_name(255), "Unknown");
    }
}
