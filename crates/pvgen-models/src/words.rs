//! English number words.
//!
//! Renders integers as cardinal ("eighty-seven") and ordinal ("fifteenth")
//! words for the spoken-readout processing rules. Covers the range the
//! pipeline actually meets (percentages, ranks, ordinals); anything above
//! the billions falls back to digits.

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Cardinal words for a non-negative integer.
pub fn cardinal(n: u64) -> String {
    if n >= 1_000_000_000_000 {
        return n.to_string();
    }
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    if n < 100 {
        let tens = TENS[(n / 10) as usize];
        let rest = n % 10;
        return if rest == 0 {
            tens.to_string()
        } else {
            format!("{}-{}", tens, ONES[rest as usize])
        };
    }
    for (scale, name) in [
        (1_000_000_000u64, "billion"),
        (1_000_000, "million"),
        (1_000, "thousand"),
        (100, "hundred"),
    ] {
        if n >= scale {
            let head = cardinal(n / scale);
            let rest = n % scale;
            return if rest == 0 {
                format!("{} {}", head, name)
            } else {
                format!("{} {} {}", head, name, cardinal(rest))
            };
        }
    }
    unreachable!("n < 100 handled above")
}

/// Ordinal words for a non-negative integer.
pub fn ordinal(n: u64) -> String {
    let words = cardinal(n);
    // Only the final word changes form
    let (head, last) = match words.rfind(' ') {
        Some(idx) => (&words[..=idx], &words[idx + 1..]),
        None => ("", words.as_str()),
    };
    // Hyphenated compounds change only the trailing part
    let (prefix, tail) = match last.rfind('-') {
        Some(idx) => (&last[..=idx], &last[idx + 1..]),
        None => ("", last),
    };
    let tail = ordinal_word(tail);
    format!("{}{}{}", head, prefix, tail)
}

fn ordinal_word(word: &str) -> String {
    match word {
        "one" => "first".to_string(),
        "two" => "second".to_string(),
        "three" => "third".to_string(),
        "five" => "fifth".to_string(),
        "eight" => "eighth".to_string(),
        "nine" => "ninth".to_string(),
        "twelve" => "twelfth".to_string(),
        w if w.ends_with('y') => format!("{}ieth", &w[..w.len() - 1]),
        w => format!("{}th", w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_small() {
        assert_eq!(cardinal(0), "zero");
        assert_eq!(cardinal(7), "seven");
        assert_eq!(cardinal(15), "fifteen");
        assert_eq!(cardinal(20), "twenty");
        assert_eq!(cardinal(87), "eighty-seven");
    }

    #[test]
    fn test_cardinal_compound() {
        assert_eq!(cardinal(100), "one hundred");
        assert_eq!(cardinal(101), "one hundred one");
        assert_eq!(cardinal(342), "three hundred forty-two");
        assert_eq!(cardinal(1_000), "one thousand");
        assert_eq!(cardinal(12_045), "twelve thousand forty-five");
        assert_eq!(cardinal(2_000_000), "two million");
    }

    #[test]
    fn test_ordinal_irregular() {
        assert_eq!(ordinal(1), "first");
        assert_eq!(ordinal(2), "second");
        assert_eq!(ordinal(3), "third");
        assert_eq!(ordinal(5), "fifth");
        assert_eq!(ordinal(8), "eighth");
        assert_eq!(ordinal(9), "ninth");
        assert_eq!(ordinal(12), "twelfth");
    }

    #[test]
    fn test_ordinal_regular() {
        assert_eq!(ordinal(15), "fifteenth");
        assert_eq!(ordinal(20), "twentieth");
        assert_eq!(ordinal(21), "twenty-first");
        assert_eq!(ordinal(87), "eighty-seventh");
        assert_eq!(ordinal(100), "one hundredth");
        assert_eq!(ordinal(101), "one hundred first");
    }
}
