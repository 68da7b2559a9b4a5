/// Split a transcript into trimmed, non-empty sentences.
///
/// Runs of `.`, `!` and `?` end a sentence. A `.` with a digit on both sides
/// is a decimal point and stays inside the sentence. A transcript without any
/// terminator comes back as a single sentence.
pub fn split_sentences(transcript: &str) -> Vec<String> {
    let chars: Vec<char> = transcript.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let terminator = match c {
            '!' | '?' => true,
            '.' => !is_decimal_point(&chars, i),
            _ => false,
        };

        if terminator {
            push_trimmed(&mut sentences, &current);
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn is_decimal_point(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|p| chars.get(p));
    let after = chars.get(i + 1);
    matches!((before, after), (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit())
}

fn push_trimmed(sentences: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
