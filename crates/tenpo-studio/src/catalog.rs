// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixed catalog of interior design rules ("textbook" items).
//!
//! Every rule is phrased conditionally ("if X exists, do Y; otherwise do
//! nothing"), so any selection can be appended to any edit instruction.

use serde::Serialize;

/// One rule in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleItem {
    pub id: &'static str,
    pub title: &'static str,
    pub chapter_number: u8,
    pub chapter_title: &'static str,
}

/// A chapter with its rules, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub number: u8,
    pub title: &'static str,
    pub items: Vec<RuleItem>,
}

/// Chapter numbers and titles, in display order.
pub const CHAPTERS: [(u8, &str); 4] = [(1, "ファサード"), (2, "店内"), (3, "厨房"), (4, "設備")];

const fn chapter_title(number: u8) -> &'static str {
    match number {
        1 => CHAPTERS[0].1,
        2 => CHAPTERS[1].1,
        3 => CHAPTERS[2].1,
        _ => CHAPTERS[3].1,
    }
}

const fn rule(id: &'static str, chapter_number: u8, title: &'static str) -> RuleItem {
    RuleItem {
        id,
        title,
        chapter_number,
        chapter_title: chapter_title(chapter_number),
    }
}

/// The complete catalog, in display order.
pub static RULES: &[RuleItem] = &[
    rule("1-1.1", 1, "入り口から見えるカウンターがあればハの字に設計し、外から見た時のインパクトを出す。もしなければ何もしない。"),
    rule("1-1.2", 1, "2階席があれば看板や描き絵等で目立つように明記する。もしなければ何もしない。"),
    rule("1-1.3", 1, "のれんがあればライティングを施す（特に白系）。もしなければ何もしない。"),
    rule("1-1.4", 1, "袖看板・置き看板があれば設置し、外部コンセントの有無を確認する。もしなければ何もしない。"),
    rule("1-1.5", 1, "オーニングや軒下があれば明かりを確保する。もしなければ何もしない。"),
    rule("1-1.6", 1, "大衆業態であれば内部の雰囲気が店外に溢れるよう開口部を大きくする。もしなければ何もしない。"),
    rule("1-1.7", 1, "暖簾など布製品が1000mm超であれば防炎製品にする。もしなければ何もしない。"),
    rule("1-1.8", 1, "消防突入口や避難器具設置位置があれば降下障害とならないよう計画する。もしなければ何もしない。"),
    rule("1-1.9", 1, "前面道路からの延焼ラインがあれば窓材質を決定する。もしなければ何もしない。"),
    rule("1-1.10", 1, "商店街内に出店する場合は規制があれば従う。もしなければ何もしない。"),
    rule("1-1.11", 1, "ドアがあれば押す/引くサインを必ず表記する。もしなければ何もしない。"),
    rule("1-1.12", 1, "敷地境界線があれば給湯器や室外機の設置場所を検討する。もしなければ何もしない。"),
    rule("1-1.13", 1, "大きなグラフィックが10㎡超であれば屋外広告物申請を行う。もしなければ何もしない。"),
    rule("1-1.14", 1, "壁面にダクト開口を設ける場合は100mm以上離す。もしなければ何もしない。"),
    rule("1-1.15", 1, "犬走りタイルがあれば防滑性能の高いものを選定する。もしなければ何もしない。"),
    rule("2-1.1", 2, "お客様の手に触れる物があれば本物の素材にする。もしなければ何もしない。"),
    rule("2-1.2", 2, "ブリックタイルの描き絵があれば使用しない。もしなければ何もしない。"),
    rule("2-1.3", 2, "テーブルがあれば高さは座面+280を基本にする。もしなければ何もしない。"),
    rule("2-1.4", 2, "トイレ内腰があれば塗り系素材を避け、タイル等にする。もしなければ何もしない。"),
    rule("2-1.5", 2, "トイレ内CPがあればフロスト系を推奨する。もしなければ何もしない。"),
    rule("2-1.6", 2, "トイレ内の壁があれば正面と背面を同色、左右を同色にする。もしなければ何もしない。"),
    rule("2-1.7", 2, "カウンター腰があれば荷物置きやフックを設置する。もしなければ何もしない。"),
    rule("2-1.8", 2, "テーブル脚があればフックを付ける。もしなければ何もしない。"),
    rule("2-1.9", 2, "業態によって必要であればテーブルにワインクーラーの落とし込みを作る。もしなければ何もしない。"),
    rule("2-1.10", 2, "厨房入り口があれば必ずタレ壁を設ける。もしなければ何もしない。"),
    rule("2-1.11", 2, "集成材を使う場合ははぎ合わせを避ける。もしなければ何もしない。"),
    rule("2-1.12", 2, "テーブル天板小口材があればはみ出し寸法は10mm以下に抑える。もしなければ何もしない。"),
    rule("2-1.13", 2, "壁面の仕上げがあれば向かい面同士をそろえる。もしなければ何もしない。"),
    rule("2-1.14", 2, "カーテン等の布製品が1000mm超であれば防炎製品にする。もしなければ何もしない。"),
    rule("2-1.15", 2, "ペンダントライトがあればコード色に注意する。もしなければ何もしない。"),
    rule("2-1.16", 2, "LED電球があれば調光器対応を確認して発注する。もしなければ何もしない。"),
    rule("2-1.17", 2, "ランプがあれば色温度に配慮する。もしなければ何もしない。"),
    rule("2-1.18", 2, "ドアがあれば室名表記と押す/引くサインを必ず表記する。もしなければ何もしない。"),
    rule("2-1.19", 2, "椅子があれば掃除しやすい素材を選定する。もしなければ何もしない。"),
    rule("2-1.20", 2, "古民家など古い建物を使う場合は隙間風や窓の立て付けを確認し修繕する。もしなければ何もしない。"),
    rule("2-1.21", 2, "神奈川県で客席があれば専用手洗い器を設置する。もしなければ何もしない。"),
    rule("2-2.1", 3, "厨房が狭ければ作業場所確保のためシンク塞ぎ板やゲタの有無を確認する。もしなければ何もしない。"),
    rule("2-2.2", 3, "電子レンジがあれば専用電源を確保する。もしなければ何もしない。"),
    rule("2-2.3", 3, "排気フードがあれば可燃物まで100以上離す。もしなければ何もしない。"),
    rule("2-2.4", 3, "厨房器具とカウンター高さをそろえる場合は可燃物を150以上離すか不燃材で仕切る。もしなければ何もしない。"),
    rule("2-2.5", 3, "フライヤー横にシンクや熱源横に製氷機がある場合は避け、必要なら遮熱版で対応する。もしなければ何もしない。"),
    rule("2-2.6", 3, "グリストラップが必要なら図面に反映して不備を防ぐ。もしなければ何もしない。"),
    rule("2-2.7", 3, "フライヤー等熱機器があればグリースフィルターまで1000mm以上離す。もしなければ何もしない。"),
    rule("2-2.8", 3, "厨房内に手洗い器があれば設置する。もしなければ何もしない。"),
    rule("2-2.9", 3, "厨房内があれば平滑で掃除しやすい仕上げにする。もしなければ何もしない。"),
    rule("1-1.1-4", 4, "厨房内の吸気口があれば位置に注意する（焼肉・鉄板系は給気多い）。もしなければ何もしない。"),
    rule("1-1.2-4", 4, "店内空調があれば厨房には引き込まない（厨房は冷房のみ）。もしなければ何もしない。"),
    rule("1-1.3-4", 4, "空調機があれば位置・角度を調整して局部的な暑さ寒さを防ぐ。もしなければ何もしない。"),
    rule("1-1.4-4", 4, "上階が屋上や屋根であれば馬力数を1.5～2倍に設定する。もしなければ何もしない。"),
    rule("1-1.5-4", 4, "エアコンがあればフェイスは最初に確認・指定（黒 or 白）にする。もしなければ何もしない。"),
    rule("1-1.6-4", 4, "冷媒・ドレン配管があればルートを想定して排水勾配を早期に決定する。もしなければ何もしない。"),
];

/// Looks up a rule by id.
pub fn find(id: &str) -> Option<&'static RuleItem> {
    RULES.iter().find(|rule| rule.id == id)
}

/// Resolves ids to rules, preserving input order.
///
/// Returns the first unknown id as the error.
pub fn resolve<S: AsRef<str>>(ids: &[S]) -> Result<Vec<RuleItem>, String> {
    ids.iter()
        .map(|id| find(id.as_ref()).copied().ok_or_else(|| id.as_ref().to_string()))
        .collect()
}

/// The catalog grouped by chapter.
pub fn chapters() -> Vec<Chapter> {
    CHAPTERS
        .iter()
        .map(|&(number, title)| Chapter {
            number,
            title,
            items: RULES
                .iter()
                .filter(|rule| rule.chapter_number == number)
                .copied()
                .collect(),
        })
        .collect()
}
