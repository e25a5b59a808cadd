//! Built-in team catalog.
//!
//! Preset rosters are kept as `"<number> <name>"` lines and parsed on
//! demand. A user-saved team with the same name takes precedence, see
//! [`TeamDatabase::find_or_preset`](super::database::TeamDatabase::find_or_preset).

use super::roster::{identity_key, parse_roster_line, Player, Role, Team};

/// Team name and roster lines of every preset team.
pub const PRESET_TEAMS: &[(&str, &[&str])] = &[
    (
        "內湖高中",
        &[
            "2 張恩愷", "3 蔡明諺", "5 郭庭川", "7 郭愷洛", "8 馬德霖", "9 張凱恩", "10 曾承閎",
            "12 詹智凱", "13 邱于泓", "16 吳炘恩", "17 李泓毅", "18 郭丞宥", "19 王鴻銘",
            "20 秦琮祐",
        ],
    ),
    (
        "建國中學",
        &[
            "2 李宗恩", "4 王元廷", "7 蔡鈞麒", "9 洪靖淳", "10 趙奕鈞", "11 陳奕銓", "12 施博鈞",
            "13 薛尚宸", "14 鄭稷珩", "15 李弘緯", "16 林柚宇", "18 黃泓瑋",
        ],
    ),
    (
        "成功高中",
        &[
            "1 楊哲廷", "2 周裕軒", "5 陳立閎", "7 施書楷", "8 李育睿", "10 溫宇哲", "12 劉軒豪",
            "14 許子洛", "15 黎承宣", "16 白偉呈", "17 陳品叡", "18 林軒愷",
        ],
    ),
    (
        "福誠高中",
        &[
            "1 許悅", "2 葛霖熙", "3 趙柏愷", "4 林俊毅", "5 陳秉鑫", "6 邱昱恩", "7 張正楷",
            "8 陳冠銘", "9 薛秉毅", "10 劉東澄", "11 顏宇濬", "12 羅凱彥",
        ],
    ),
    (
        "明德高中",
        &[
            "2 高奕安", "5 王宥允", "6 陳冠豪", "7 黃翌富", "8 胡均祥", "9 周秉辰", "14 陳宥亘",
            "16 拿耀達夫", "17 何泓學", "18 全仁", "19 李修陞", "20 吳冠杰",
        ],
    ),
    (
        "豐原高商",
        &[
            "1 林承安", "3 劉恩璘", "7 蘇子期", "9 陳琨霖", "10 張進良", "11 劉冠朋", "12 林季孺",
            "14 嚴偉桓", "15 翁郁盛", "17 莊子霆", "19 梁丞宇", "20 李宸嘉",
        ],
    ),
    (
        "內湖高工",
        &[
            "2 何曾右", "5 曾逸揚", "6 林炫諭", "7 黃文宇", "8 詹竣宇", "9 李孝謙", "10 黃承鋒",
            "11 許沅塘", "13 劉建成", "16 潘威辰", "18 陳曾俊宸", "19 盧秉澤",
        ],
    ),
    (
        "華僑高中",
        &[
            "1 黃孝宸", "3 林家詳", "4 鍾曜凱", "6 李傲儒", "7 林元宥", "10 柯柏亘", "11 黃品諺",
            "13 簡嘉陞", "14 杜家競", "15 黃文廷", "19 林立瑋", "20 王禹喆",
        ],
    ),
    (
        "苑裡高中",
        &[
            "4 林雋恩", "5 柯昱承", "6 溫原朗", "7 王品皓", "8 張閎理", "9 鄭文冠", "10 林昱安",
            "11 張晉賓", "13 張瑋修", "14 黃泳豪", "18 張祐琦", "19 鄭景瀚",
        ],
    ),
    (
        "屏榮高中",
        &[
            "1 李浚亦", "2 陳思愷", "3 李駿", "4 施予恩", "6 潘俊佑", "7 潘尚余", "8 蔡東橙",
            "9 吳宸瑋", "11 謝淯鋐", "12 鄭瑋杰", "13 林翰杰", "17 林聖恩",
        ],
    ),
    (
        "麥寮高中",
        &[
            "1 許育翔", "2 韓愷辰", "3 李宗智", "4 楊絮安", "5 吳秉宏", "7 林軒毅", "8 謝宏崎",
            "9 洪柏翔", "10 王宥程", "11 吳祐宗", "13 范宇助", "20 林友漢",
        ],
    ),
    (
        "曾文農工",
        &[
            "1 薛滕翰", "2 王彥勛", "3 何昀翰", "4 曾勝鴻", "5 朱嘉惟", "6 陳鴻銘", "8 吳宥諄",
            "9 王介瑞", "10 何嘉源", "11 邱聰謀", "12 徐于鈞", "13 李昆朋",
        ],
    ),
];

fn build(name: &str, lines: &[&str]) -> Team {
    let players = lines
        .iter()
        .filter_map(|line| parse_roster_line(line))
        .map(|(number, player_name)| Player::new(number, player_name, Role::Unassigned));
    Team::with_players(name, players)
}

/// Names of the preset teams, in catalog order.
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESET_TEAMS.iter().map(|(name, _)| *name)
}

/// All preset teams.
pub fn preset_teams() -> Vec<Team> {
    PRESET_TEAMS
        .iter()
        .map(|(name, lines)| build(name, lines))
        .collect()
}

/// The preset team with this name, matched like saved teams.
pub fn find_preset(name: &str) -> Option<Team> {
    let key = identity_key(name);
    PRESET_TEAMS
        .iter()
        .find(|(preset, _)| identity_key(preset) == key)
        .map(|(preset, lines)| build(preset, lines))
}
