//! English words form of a monetary total, printed beneath the summary box.

const ONES: [&str; 10] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];
const TEENS: [&str; 10] = [
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
// The whole part is bounded by u64 cents (below 10^18), so six scale words
// cover every representable amount.
const SCALES: [&str; 6] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
];

/// Render a 1..=999 group as words, "and" joining hundreds to the remainder.
fn group_words(mut n: u64, out: &mut Vec<String>) {
    debug_assert!(n > 0 && n < 1000);
    if n >= 100 {
        out.push(ONES[(n / 100) as usize].to_string());
        out.push("hundred".to_string());
        n %= 100;
        if n > 0 {
            out.push("and".to_string());
        }
    }
    if n >= 20 {
        out.push(TENS[(n / 10) as usize].to_string());
        if n % 10 > 0 {
            out.push(ONES[(n % 10) as usize].to_string());
        }
    } else if n >= 10 {
        out.push(TEENS[(n - 10) as usize].to_string());
    } else if n > 0 {
        out.push(ONES[n as usize].to_string());
    }
}

/// Spell a non-negative amount in English, cents included when nonzero.
/// The amount is rounded to the nearest cent before splitting, and only the
/// first letter of the result is capitalized.
pub fn amount_in_words(amount: f64) -> String {
    let cents_total = (amount.max(0.0) * 100.0).round() as u64;
    let whole = cents_total / 100;
    let cents = cents_total % 100;

    if whole == 0 && cents == 0 {
        return "Zero".to_string();
    }

    let mut words: Vec<String> = Vec::new();

    if whole == 0 {
        words.push("zero".to_string());
    } else {
        // Split into 3-digit groups, most significant first.
        let mut groups: Vec<(u64, usize)> = Vec::new();
        let mut n = whole;
        let mut scale = 0usize;
        while n > 0 {
            groups.push((n % 1000, scale));
            n /= 1000;
            scale += 1;
        }
        for &(group, scale) in groups.iter().rev() {
            if group == 0 {
                continue;
            }
            group_words(group, &mut words);
            if scale > 0 {
                words.push(SCALES[scale].to_string());
            }
        }
    }

    if cents > 0 {
        words.push("and".to_string());
        group_words(cents, &mut words);
        words.push("cents".to_string());
    }

    let mut result = words.join(" ");
    if let Some(first) = result.get(..1) {
        let capital = first.to_uppercase();
        result.replace_range(..1, &capital);
    }
    result
}
