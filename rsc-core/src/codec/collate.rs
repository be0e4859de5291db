use std::cmp::Ordering;

// Root collation order of ASCII punctuation and symbols. Everything here sorts before digits,
// digits sort before letters.
const SYMBOL_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Space,
    Symbol,
    Digit,
    Letter,
}

fn primary(c: char) -> (Class, u32) {
    if c.is_whitespace() {
        (Class::Space, c as u32)
    } else if c.is_alphabetic() {
        let folded = c.to_lowercase().next().unwrap_or(c);
        (Class::Letter, folded as u32)
    } else if c.is_numeric() {
        (Class::Digit, c.to_digit(10).unwrap_or(c as u32))
    } else {
        let rank = SYMBOL_ORDER
            .find(c)
            .map(|i| i as u32)
            .unwrap_or(SYMBOL_ORDER.len() as u32 + c as u32);
        (Class::Symbol, rank)
    }
}

/// 近似 ICU 根排序规则的字符串比较，索引按它排序。
///
/// 先按主权重（空白 < 标点符号 < 数字 < 字母，字母忽略大小写）比较，
/// 主权重相同再让小写排在大写前，最后按码点兜底。
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary)
        .cmp(b.chars().map(primary))
        .then_with(|| {
            a.chars()
                .map(|c| c.is_uppercase())
                .cmp(b.chars().map(|c| c.is_uppercase()))
        })
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_before_digits_before_letters() {
        assert_eq!(locale_cmp("res:/a_b", "res:/ab"), Ordering::Less);
        assert_eq!(locale_cmp("res:/a1", "res:/aa"), Ordering::Less);
        assert_eq!(locale_cmp("res:/a/b", "res:/a0"), Ordering::Less);
    }

    #[test]
    fn underscore_sorts_before_dot() {
        // 与按字节排序不同
        assert!("a.txt" < "a_b");
        assert_eq!(locale_cmp("a_b", "a.txt"), Ordering::Less);
    }

    #[test]
    fn case_only_breaks_ties() {
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("A", "b"), Ordering::Less);
        assert_eq!(locale_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(locale_cmp("app:/a", "app:/ab"), Ordering::Less);
        assert_eq!(locale_cmp("", "a"), Ordering::Less);
    }
}
