//! Values a printer knows how to lay out.
//!
//! Anything printed goes through `Render`, which turns it into a `Value`.
//! `Value` is a closed set: text, scalars, sequences, maps, pairs, optionals
//! and durations. A new kind of container is supported by rendering it into
//! one of these variants, usually `Value::Seq`.

use std::borrow::Cow;
use std::collections::{
    BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque,
};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::ansi::{self, AnsiColor, EscapeTest};

/// A value ready to be laid out by a printer.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<'a> {
    /// Text that is written verbatim and may carry escape sequences.
    Text(Cow<'a, str>),
    /// Numbers, booleans, characters and any other `Display` value. Never an
    /// escape sequence.
    Scalar(String),
    /// An ordered sequence, written as `[e1, e2, ...]`.
    Seq(Vec<Value<'a>>),
    /// Associative entries, each written as `[key, value]`.
    Map(Vec<(Value<'a>, Value<'a>)>),
    /// A pair, written as `[first, second]`.
    Pair(Box<Value<'a>>, Box<Value<'a>>),
    /// The contained value, or `None`.
    Optional(Option<Box<Value<'a>>>),
    /// A duration with a unit suffix.
    Span(Span),
}

impl<'a> Value<'a> {
    /// Returns true if this value is text that passes the given escape test.
    ///
    /// Only `Value::Text` is ever an escape sequence.
    pub fn is_escape(&self, test: EscapeTest) -> bool {
        match *self {
            Value::Text(ref text) => ansi::is_escape(text, test),
            _ => false,
        }
    }

    /// Appends the textual form of this value to `out`.
    pub fn push_to(&self, out: &mut String) {
        match *self {
            Value::Text(ref text) => out.push_str(text),
            Value::Scalar(ref scalar) => out.push_str(scalar),
            Value::Seq(ref items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.push_to(out);
                }
                out.push(']');
            }
            Value::Map(ref entries) => {
                out.push('[');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    push_pair(out, key, value);
                }
                out.push(']');
            }
            Value::Pair(ref first, ref second) => {
                push_pair(out, first, second)
            }
            Value::Optional(Some(ref value)) => value.push_to(out),
            Value::Optional(None) => out.push_str("None"),
            Value::Span(ref span) => out.push_str(&span.to_string()),
        }
    }
}

fn push_pair(out: &mut String, first: &Value<'_>, second: &Value<'_>) {
    out.push('[');
    first.push_to(out);
    out.push_str(", ");
    second.push_to(out);
    out.push(']');
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.push_to(&mut out);
        f.write_str(&out)
    }
}

/// Something that can be printed.
///
/// Implementations exist for strings, numbers, `bool`, `char`, the standard
/// collections, `Option`, pairs, `Duration` and `Span`. Use `Displayed` (or
/// `ptc::display`) for any other type that implements `Display`.
pub trait Render {
    /// Converts this value into its printable form.
    fn render(&self) -> Value<'_>;
}

impl Render for str {
    fn render(&self) -> Value<'_> {
        Value::Text(Cow::Borrowed(self))
    }
}

impl Render for String {
    fn render(&self) -> Value<'_> {
        Value::Text(Cow::Borrowed(self.as_str()))
    }
}

impl Render for Cow<'_, str> {
    fn render(&self) -> Value<'_> {
        Value::Text(Cow::Borrowed(self.as_ref()))
    }
}

impl Render for AnsiColor {
    fn render(&self) -> Value<'_> {
        Value::Text(Cow::Owned(self.to_string()))
    }
}

impl<'a> Render for Value<'a> {
    fn render(&self) -> Value<'_> {
        self.clone()
    }
}

macro_rules! impl_render_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Render for $ty {
                fn render(&self) -> Value<'_> {
                    Value::Scalar(self.to_string())
                }
            }
        )*
    };
}

impl_render_scalar!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    bool, char,
);

impl<T: Render + ?Sized> Render for &T {
    fn render(&self) -> Value<'_> {
        (**self).render()
    }
}

impl<T: Render + ?Sized> Render for &mut T {
    fn render(&self) -> Value<'_> {
        (**self).render()
    }
}

impl<T: Render + ?Sized> Render for Box<T> {
    fn render(&self) -> Value<'_> {
        (**self).render()
    }
}

impl<T: Render + ?Sized> Render for Rc<T> {
    fn render(&self) -> Value<'_> {
        (**self).render()
    }
}

impl<T: Render + ?Sized> Render for Arc<T> {
    fn render(&self) -> Value<'_> {
        (**self).render()
    }
}

fn seq<'a, T, I>(items: I) -> Value<'a>
where
    T: Render + 'a,
    I: IntoIterator<Item = &'a T>,
{
    Value::Seq(items.into_iter().map(Render::render).collect())
}

impl<T: Render> Render for [T] {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

impl<T: Render, const N: usize> Render for [T; N] {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

impl<T: Render> Render for VecDeque<T> {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

impl<T: Render> Render for LinkedList<T> {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

impl<T: Render> Render for BTreeSet<T> {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

impl<T: Render, S> Render for HashSet<T, S> {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

/// Elements are written in the heap's storage order, without draining it.
impl<T: Render> Render for BinaryHeap<T> {
    fn render(&self) -> Value<'_> {
        seq(self)
    }
}

impl<K: Render, V: Render> Render for BTreeMap<K, V> {
    fn render(&self) -> Value<'_> {
        Value::Map(self.iter().map(|(k, v)| (k.render(), v.render())).collect())
    }
}

impl<K: Render, V: Render, S> Render for HashMap<K, V, S> {
    fn render(&self) -> Value<'_> {
        Value::Map(self.iter().map(|(k, v)| (k.render(), v.render())).collect())
    }
}

impl<A: Render, B: Render> Render for (A, B) {
    fn render(&self) -> Value<'_> {
        Value::Pair(Box::new(self.0.render()), Box::new(self.1.render()))
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self) -> Value<'_> {
        Value::Optional(self.as_ref().map(|v| Box::new(v.render())))
    }
}

impl Render for Span {
    fn render(&self) -> Value<'_> {
        Value::Span(*self)
    }
}

impl Render for Duration {
    fn render(&self) -> Value<'_> {
        Value::Span(Span::from(*self))
    }
}

/// Prints any `Display` value as a scalar.
#[derive(Clone, Copy, Debug)]
pub struct Displayed<T>(pub T);

impl<T: fmt::Display> Render for Displayed<T> {
    fn render(&self) -> Value<'_> {
        Value::Scalar(self.0.to_string())
    }
}

/// Wraps a `Display` value so it can be printed.
pub fn display<T: fmt::Display>(value: T) -> Displayed<T> {
    Displayed(value)
}

/// The unit of a `Span`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl TimeUnit {
    /// The suffix written after the count.
    pub fn suffix(&self) -> &'static str {
        match *self {
            TimeUnit::Nanos => "ns",
            TimeUnit::Micros => "us",
            TimeUnit::Millis => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
            TimeUnit::Weeks => "w",
            TimeUnit::Months => "mos",
            TimeUnit::Years => "y",
        }
    }
}

/// A count of time in a fixed unit, printed as e.g. `5s` or `3min`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    count: i128,
    unit: TimeUnit,
}

impl Span {
    /// Creates a span of `count` units.
    pub fn new(count: i128, unit: TimeUnit) -> Span {
        Span { count, unit }
    }

    /// The number of units.
    pub fn count(&self) -> i128 {
        self.count
    }

    /// The unit.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn nanos(count: i128) -> Span {
        Span::new(count, TimeUnit::Nanos)
    }

    pub fn micros(count: i128) -> Span {
        Span::new(count, TimeUnit::Micros)
    }

    pub fn millis(count: i128) -> Span {
        Span::new(count, TimeUnit::Millis)
    }

    pub fn seconds(count: i128) -> Span {
        Span::new(count, TimeUnit::Seconds)
    }

    pub fn minutes(count: i128) -> Span {
        Span::new(count, TimeUnit::Minutes)
    }

    pub fn hours(count: i128) -> Span {
        Span::new(count, TimeUnit::Hours)
    }

    pub fn days(count: i128) -> Span {
        Span::new(count, TimeUnit::Days)
    }

    pub fn weeks(count: i128) -> Span {
        Span::new(count, TimeUnit::Weeks)
    }

    pub fn months(count: i128) -> Span {
        Span::new(count, TimeUnit::Months)
    }

    pub fn years(count: i128) -> Span {
        Span::new(count, TimeUnit::Years)
    }
}

/// Picks the coarsest of seconds, milliseconds, microseconds and nanoseconds
/// that holds the duration exactly.
impl From<Duration> for Span {
    fn from(duration: Duration) -> Span {
        // Duration::MAX in nanoseconds is well below i128::MAX.
        let nanos = duration.as_nanos() as i128;
        if nanos % 1_000_000_000 == 0 {
            Span::seconds(nanos / 1_000_000_000)
        } else if nanos % 1_000_000 == 0 {
            Span::millis(nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            Span::micros(nanos / 1_000)
        } else {
            Span::nanos(nanos)
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    fn text(value: &dyn Render) -> String {
        value.render().to_string()
    }

    #[test]
    fn sequences() {
        assert_eq!(text(&vec![1, 2, 3]), "[1, 2, 3]");
        assert_eq!(text(&[1.5, 2.0]), "[1.5, 2]");
        assert_eq!(text(&Vec::<i32>::new()), "[]");
        assert_eq!(text(&VecDeque::from(["a", "b"])), "[a, b]");
        assert_eq!(text(&vec![vec![1], vec![2, 3]]), "[[1], [2, 3]]");
    }

    #[test]
    fn maps_write_entries_as_pairs() {
        let map = BTreeMap::from([(1, 2), (2, 2), (3, 3)]);
        assert_eq!(text(&map), "[[1, 2], [2, 2], [3, 3]]");
        assert_eq!(text(&("key", 'v')), "[key, v]");
    }

    #[test]
    fn heap_is_not_drained() {
        let heap = BinaryHeap::from(vec![8]);
        assert_eq!(text(&heap), "[8]");
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn optionals() {
        assert_eq!(text(&Some(3)), "3");
        assert_eq!(text(&None::<i32>), "None");
        assert_eq!(text(&vec![Some("x"), None]), "[x, None]");
    }

    #[test_case(Span::nanos(7), "7ns")]
    #[test_case(Span::micros(7), "7us")]
    #[test_case(Span::millis(7), "7ms")]
    #[test_case(Span::seconds(5), "5s")]
    #[test_case(Span::minutes(3), "3min")]
    #[test_case(Span::hours(2), "2h")]
    #[test_case(Span::days(1), "1d")]
    #[test_case(Span::weeks(4), "4w")]
    #[test_case(Span::months(6), "6mos")]
    #[test_case(Span::years(-1), "-1y")]
    fn span_suffixes(span: Span, expected: &str) {
        assert_eq!(text(&span), expected);
    }

    #[test_case(Duration::from_secs(5), "5s")]
    #[test_case(Duration::from_millis(1500), "1500ms")]
    #[test_case(Duration::from_micros(2), "2us")]
    #[test_case(Duration::from_nanos(1_000_000_001), "1000000001ns")]
    #[test_case(Duration::ZERO, "0s")]
    fn std_durations(duration: Duration, expected: &str) {
        assert_eq!(text(&duration), expected);
    }

    #[test]
    fn only_text_can_be_an_escape() {
        assert!("\x1B[31m".render().is_escape(EscapeTest::First));
        assert!(String::from("a\x1B[0m").render().is_escape(EscapeTest::Generic));
        assert!(!'\x1B'.render().is_escape(EscapeTest::Generic));
        assert!(!vec!["\x1B[31m"].render().is_escape(EscapeTest::Generic));
        assert!(!display("\x1B[31m").render().is_escape(EscapeTest::First));
    }

    #[test]
    fn displayed_values_are_scalars() {
        let addr = std::net::Ipv4Addr::LOCALHOST;
        assert_eq!(display(addr).render(), Value::Scalar("127.0.0.1".into()));
    }
}
