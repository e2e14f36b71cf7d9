//! 用户称呼推断
//!
//! 在用户消息里找 "my name is ..."，取其后的第一个词作为称呼。
//! 纯启发式，不保证正确，结果也不写回任何持久化数据。

use crate::memory::conversation::{Role, Turn};

const NAME_PHRASE: &str = "my name is";

/// 按时间顺序扫描用户消息，返回第一个能识别出的名字
pub fn infer_name(turns: &[Turn]) -> Option<String> {
    turns
        .iter()
        .filter(|turn| turn.role == Role::User)
        .find_map(|turn| infer_name_from_text(&turn.content))
}

/// 从单条文本中识别名字
pub fn infer_name_from_text(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let (_, rest) = lowered.split_once(NAME_PHRASE)?;
    let candidate: String = rest
        .split_whitespace()
        .next()?
        .chars()
        .filter(|c| *c != '.' && *c != '!')
        .collect();
    capitalize(&candidate)
}

fn capitalize(word: &str) -> Option<String> {
    let mut chars = word.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_introduction() {
        assert_eq!(infer_name_from_text("Hi, my name is Alex"), Some("Alex".to_string()));
        assert_eq!(infer_name_from_text("MY NAME IS alex!"), Some("Alex".to_string()));
        assert_eq!(
            infer_name_from_text("my name is   jordan. nice to meet you"),
            Some("Jordan".to_string())
        );
    }

    #[test]
    fn test_no_name() {
        assert_eq!(infer_name_from_text("what is my name?"), None);
        assert_eq!(infer_name_from_text("my name is"), None);
        assert_eq!(infer_name_from_text("my name is ..."), None);
    }

    #[test]
    fn test_scans_user_turns_only_in_order() {
        let turns = vec![
            Turn::assistant("my name is Snello"),
            Turn::user("buy milk please"),
            Turn::user("my name is sam"),
            Turn::user("actually my name is Robin"),
        ];
        assert_eq!(infer_name(&turns), Some("Sam".to_string()));
    }

    #[test]
    fn test_skips_empty_candidates() {
        let turns = vec![Turn::user("my name is !"), Turn::user("my name is Kim")];
        assert_eq!(infer_name(&turns), Some("Kim".to_string()));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(infer_name(&[]), None);
    }
}
