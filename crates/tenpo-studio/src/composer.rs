// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt composition.
//!
//! Pure functions turning structured selections into the Japanese
//! instruction text sent to the image model. Output is deterministic: the
//! same selections always produce byte-identical prompts.

use serde::{Deserialize, Serialize};

use crate::catalog::RuleItem;

/// Instruction to keep the photographed room recognisable.
pub const PRESERVE_INSTRUCTION: &str = "元の画像の構造・スケール・アングルを維持したまま";

/// Header introducing the conditional rule list.
pub const RULE_BLOCK_HEADER: &str = "以下は該当する要素があれば規定通りにしたがってほしい：";

/// Separator between cuisine genres (full-width comma).
const GENRE_SEPARATOR: &str = "、";

const STYLE_PHRASES: [&str; 4] = [
    "気軽に立ち寄れるカジュアルな雰囲気",
    "親しみやすさと上質さを兼ね備えた雰囲気",
    "落ち着きのある上質な雰囲気",
    "高級感あふれるラグジュアリーな雰囲気",
];

const BRIGHTNESS_PHRASES: [&str; 4] = [
    "自然光を活かした明るく開放的な空間",
    "やわらかく温かみのある明るさの空間",
    "間接照明を中心にした落ち着いた明るさの空間",
    "照明を絞った暗めでムードのある空間",
];

const DECORATION_PHRASES: [&str; 4] = [
    "装飾を抑えたミニマルでシンプルなデザイン",
    "さりげないアクセントを加えたすっきりしたデザイン",
    "素材感や小物で彩りを添えたデザイン",
    "装飾を豊かに施した華やかなデザイン",
];

const ERA_PHRASES: [&str; 4] = [
    "洗練された現代的なモダンデザイン",
    "モダンを基調に伝統的な要素を少し取り入れたデザイン",
    "伝統的な意匠を基調に現代的な要素を取り入れたデザイン",
    "歴史を感じさせるトラディショナルなデザイン",
];

/// A slider position in `1..=4`.
///
/// Out-of-range input is clamped when the value is constructed, so
/// indexing a phrase table can never go out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Slider(u8);

impl Slider {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Phrase table index: 1-based slider, 0-based table.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl Default for Slider {
    fn default() -> Self {
        Self(2)
    }
}

impl From<i64> for Slider {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Slider> for u8 {
    fn from(slider: Slider) -> Self {
        slider.0
    }
}

/// The four independent style sliders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignPreferences {
    pub casual_to_luxury: Slider,
    pub bright_to_dark: Slider,
    pub simple_to_decorative: Slider,
    pub modern_to_traditional: Slider,
}

/// Whether the described element is added or replaces what is there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Add,
    Replace,
}

impl EditMode {
    fn verb_phrase(self) -> &'static str {
        match self {
            EditMode::Add => "を追加",
            EditMode::Replace => "を既存のものとすべて置き換え",
        }
    }
}

/// The base-text generator a chat message uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatInstruction {
    /// The user's own words.
    Freeform { text: String },
    /// Add or replace a described element.
    AddReplace { description: String, mode: EditMode },
    /// Only the selected rules, with no other instruction.
    RulesOnly,
}

/// Initial design prompt from cuisine selections and style sliders.
pub fn compose_style_prompt(selections: &[String], preferences: &DesignPreferences) -> String {
    let genres = if selections.is_empty() {
        "指定なし".to_string()
    } else {
        selections.join(GENRE_SEPARATOR)
    };

    format!(
        "この店舗の写真を、{PRESERVE_INSTRUCTION}、以下の条件に合うレストランの内装デザインに編集してください。\n\
         料理ジャンル: {genres}\n\
         スタイル: {}\n\
         明るさ: {}\n\
         装飾度: {}\n\
         時代感: {}",
        STYLE_PHRASES[preferences.casual_to_luxury.index()],
        BRIGHTNESS_PHRASES[preferences.bright_to_dark.index()],
        DECORATION_PHRASES[preferences.simple_to_decorative.index()],
        ERA_PHRASES[preferences.modern_to_traditional.index()],
    )
}

/// Add/replace prompt; the description is both subject and object.
pub fn compose_add_replace_prompt(description: &str, mode: EditMode) -> String {
    format!(
        "画像は{description}です。その{description}{}て",
        mode.verb_phrase()
    )
}

/// Rule block: header plus one `{id}: {title}` line per rule, in input order.
///
/// An empty selection yields an empty string, never a bare header.
pub fn compose_rule_block(rules: &[RuleItem]) -> String {
    if rules.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = rules
        .iter()
        .map(|rule| format!("{}: {}", rule.id, rule.title))
        .collect();
    format!("{RULE_BLOCK_HEADER}\n{}", lines.join("\n"))
}

/// Free text, prefixed with the preserve instruction when images accompany it.
pub fn compose_freeform_prompt(user_text: &str, has_images: bool) -> String {
    if has_images {
        format!("{PRESERVE_INSTRUCTION}、次の指示に従って画像を編集してください：\n{user_text}")
    } else {
        user_text.to_string()
    }
}

/// Appends the rule block to `base`, separated by a blank line.
///
/// With no rules the base is returned untouched; with an empty base the
/// block stands alone.
pub fn compose_message(base: &str, rules: &[RuleItem]) -> String {
    let block = compose_rule_block(rules);
    match (base.is_empty(), block.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => block,
        (false, false) => format!("{base}\n\n{block}"),
    }
}

/// Full chat message text: the instruction's base text, rule block last.
pub fn compose_chat_message(
    instruction: &ChatInstruction,
    rules: &[RuleItem],
    has_images: bool,
) -> String {
    let base = match instruction {
        ChatInstruction::Freeform { text } => {
            if text.trim().is_empty() {
                String::new()
            } else {
                compose_freeform_prompt(text, has_images)
            }
        }
        ChatInstruction::AddReplace { description, mode } => {
            compose_add_replace_prompt(description, *mode)
        }
        ChatInstruction::RulesOnly => String::new(),
    };
    compose_message(&base, rules)
}
