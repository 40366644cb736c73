//! 비전 모델 지시문.
//!
//! 모델에 그대로 전달되는 텍스트이므로 영어로 유지한다.

/// 자원 바 분석 지시문
pub const RESOURCE_CHECK_PROMPT: &str = r#"You are an Age of Empires II data analyst. The image is the resource bar of a live match. Read every number exactly.

Layout of the bar:
- Each resource icon (Wood, Food, Gold, Stone) shows the stockpile as the large number to its right and the number of villagers gathering it as the small number at its bottom right.
- The number under the two-person icon is the total villager count.
- The value in XX/XXX form next to it is (total units / current house limit).
- Idle villagers, if any, appear in red on the bell icon.
- The current age and the elapsed match time are shown at the right end.

Answer with one JSON object and nothing else, using exactly these keys:
{"Resources": {"Wood": "200", "Food": "200", "Gold": "100", "Stone": "200"}, "Villagers_on_resource": {"Wood": "0", "Food": "0", "Gold": "0", "Stone": "0"}, "Villagers": "3", "Units": {"number of total units": "4", "Current House limit": "5"}, "Idle Villagers": "2", "Current_age": "Imperial Age", "Time": "00:22:44"}

If a value cannot be read, or nothing relevant is visible, use "0" for it."#;

/// 문명 코드 목록 (3글자 코드, 전체 이름)
pub const CIVILIZATION_CODES: &[(&str, &str)] = &[
    ("AZT", "Aztecs"),
    ("BEN", "Bengalis"),
    ("BER", "Berbers"),
    ("BOH", "Bohemians"),
    ("BRI", "Britons"),
    ("BUL", "Bulgarians"),
    ("BRG", "Burgundians"),
    ("BRM", "Burmese"),
    ("BYZ", "Byzantines"),
    ("CEL", "Celts"),
    ("CHI", "Chinese"),
    ("CUM", "Cumans"),
    ("DRA", "Dravidians"),
    ("ETI", "Ethiopians"),
    ("FRA", "Franks"),
    ("GOT", "Goths"),
    ("GUR", "Gurjaras"),
    ("HUN", "Huns"),
    ("INC", "Incas"),
    ("HIN", "Hindustanis"),
    ("ITA", "Italians"),
    ("JAP", "Japanese"),
    ("KHM", "Khmer"),
    ("KOR", "Koreans"),
    ("LIT", "Lithuanians"),
    ("MAG", "Magyars"),
    ("MLY", "Malay"),
    ("MLI", "Malians"),
    ("MAY", "Mayans"),
    ("MON", "Mongols"),
    ("PER", "Persians"),
    ("POL", "Poles"),
    ("POR", "Portuguese"),
    ("SAR", "Saracens"),
    ("SIC", "Sicilians"),
    ("SLA", "Slavs"),
    ("SPA", "Spanish"),
    ("TAT", "Tatars"),
    ("TEU", "Teutons"),
    ("TUR", "Turks"),
    ("VIE", "Vietnamese"),
    ("VIK", "Vikings"),
];

/// 문명 패널 분석 지시문 (본인/팀원 이름은 결과에서 제외)
pub fn civ_counter_prompt(username: &str, teammates: &[String]) -> String {
    let codes: Vec<String> = CIVILIZATION_CODES
        .iter()
        .map(|(code, name)| format!("{code} - {name}"))
        .collect();

    let mut excluded: Vec<&str> = Vec::with_capacity(teammates.len() + 1);
    if !username.trim().is_empty() {
        excluded.push(username.trim());
    }
    excluded.extend(
        teammates
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty()),
    );

    let mut prompt = format!(
        "You are an Age of Empires II screenshot analyst. The image shows the player list of a live match. \
Each player name is on the same line as a three-letter civilization code, next to the civilization emblem.\n\n\
Civilization codes:\n{}\n\n\
Answer with one JSON object mapping each player name to the FULL civilization name, never the three-letter code.\n\
Example: {{\"Chagatai Khan\": \"Mongols\", \"King Alfonso\": \"Spanish\"}}",
        codes.join("\n")
    );

    if !excluded.is_empty() {
        prompt.push_str(&format!(
            "\n\nDo not include these players: {}",
            excluded.join(", ")
        ));
    }
    prompt
}
