use super::*;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn frames(typewriter: Typewriter, count: usize) -> Vec<(String, u64)> {
    typewriter
        .take(count)
        .map(|frame| (frame.text, frame.delay.as_millis() as u64))
        .collect()
}

#[test]
fn types_holds_erases_and_wraps_around() {
    let seen = frames(Typewriter::new(["ab", "c"]), 7);

    assert_eq!(
        seen,
        vec![
            ("a".to_string(), 100),
            ("ab".to_string(), 2000),
            ("a".to_string(), 50),
            ("".to_string(), 500),
            ("c".to_string(), 2000),
            ("".to_string(), 500),
            ("a".to_string(), 100),
        ]
    );
}

#[test]
fn without_looping_the_last_phrase_stays() {
    let mut typewriter = Typewriter::new(["ab", "c"]).looping(false);
    let last = typewriter.by_ref().last().expect("frames");

    assert_eq!(last.text, "c");
    assert_eq!(last.delay, Duration::ZERO);
    assert_eq!(typewriter.phrase_index(), 1);
    assert!(typewriter.next().is_none());
}

#[test]
fn empty_phrase_list_yields_nothing() {
    let mut typewriter = Typewriter::new(Vec::<String>::new());

    assert!(typewriter.next().is_none());
}

#[test]
fn empty_phrase_still_advances() {
    let seen = frames(Typewriter::new(["", "x"]), 3);

    assert_eq!(
        seen,
        vec![
            ("".to_string(), 2000),
            ("".to_string(), 500),
            ("x".to_string(), 2000),
        ]
    );
}

#[test]
fn counts_characters_not_bytes() {
    let seen: Vec<String> = Typewriter::new(["学习者"])
        .looping(false)
        .map(|frame| frame.text)
        .collect();

    assert_eq!(seen, vec!["学", "学习", "学习者"]);
}

#[test]
fn custom_timings_are_used() {
    let timings = TypewriterTimings {
        typing: ms(1),
        deleting: ms(2),
        after_type: ms(3),
        after_delete: ms(4),
    };
    let delays: Vec<Duration> = Typewriter::new(["ab"])
        .with_timings(timings)
        .take(4)
        .map(|frame| frame.delay)
        .collect();

    assert_eq!(delays, vec![ms(1), ms(3), ms(2), ms(4)]);
}
