//! Line break opportunities between characters.
//!
//! Implements the Unicode line breaking algorithm from
//! <https://www.unicode.org/reports/tr14/> as a per-rune state machine. Rule
//! order is load-bearing: each rule assumes the ones above it already
//! excluded specific class pairs, and LB10 runs after the whole chain
//! because earlier rules need combining marks to keep their inherited class.

use bitflags::bitflags;
use unicode_linebreak::{BreakClass, break_property};
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};
use unicode_width::UnicodeWidthChar;

/// Decision for the rune just processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineBreakDecision {
    #[default]
    NoBreak,
    AllowBreakBefore,
    RequireBreakBefore,
    RequireBreakAfter,
}

bitflags! {
    /// Contextual runs that survive intervening spaces.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct RunFlags: u8 {
        const ZERO_WIDTH_SPACE = 1;
        const OPEN_BRACKET = 1 << 1;
        const QUOTATION = 1 << 2;
        const CLOSE_PUNCT = 1 << 3;
        const DASH = 1 << 4;
    }
}

/// Stateful classifier finding possible breakpoints between lines.
#[derive(Clone, Debug, Default)]
pub struct LineBreaker {
    last_prop: Option<BreakClass>,
    last_last_prop: Option<BreakClass>,
    runs: RunFlags,
    last_props_were_ri_odd: bool,
}

/// LB1: assign a line breaking class to each code point.
fn resolved_class(r: char) -> BreakClass {
    use BreakClass as C;
    match break_property(r as u32) {
        // Unassigned, ambiguous, and surrogate classes resolve to AL.
        C::Unknown | C::Ambiguous | C::Surrogate => C::Alphabetic,
        C::ComplexContext => match r.general_category() {
            GeneralCategory::NonspacingMark | GeneralCategory::SpacingMark => C::CombiningMark,
            _ => C::Alphabetic,
        },
        C::ConditionalJapaneseStarter => C::NonStarter,
        prop => prop,
    }
}

/// East Asian Fullwidth, Wide, or Halfwidth. Fullwidth and Wide are exactly
/// the width-2 characters; Halfwidth is the explicit forms block.
fn is_east_asian_fwh(r: char) -> bool {
    UnicodeWidthChar::width(r) == Some(2)
        || matches!(r,
            '\u{20A9}'
            | '\u{FF61}'..='\u{FFBE}'
            | '\u{FFC2}'..='\u{FFC7}'
            | '\u{FFCA}'..='\u{FFCF}'
            | '\u{FFD2}'..='\u{FFD7}'
            | '\u{FFDA}'..='\u{FFDC}'
            | '\u{FFE8}'..='\u{FFEE}')
}

impl LineBreaker {
    /// Create a breaker at the start of text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process the next rune and report the break decision at its position.
    #[allow(clippy::too_many_lines)]
    pub fn process_rune(&mut self, r: char) -> LineBreakDecision {
        use BreakClass as C;
        use LineBreakDecision as D;

        let mut prop = resolved_class(r);
        let last = self.last_prop;
        let last_last = self.last_last_prop;
        let mut decision = D::NoBreak;

        'rules: {
            // LB4: Always break after hard line breaks.
            if prop == C::Mandatory && last != Some(C::CarriageReturn) {
                decision = D::RequireBreakAfter;
                break 'rules;
            }

            // LB5: Treat CR followed by LF, as well as CR, LF, and NL as
            // hard line breaks.
            if last == Some(C::CarriageReturn) && prop == C::LineFeed {
                decision = D::RequireBreakAfter;
                break 'rules;
            } else if last == Some(C::CarriageReturn) {
                decision = D::RequireBreakBefore;
                break 'rules;
            } else if prop == C::LineFeed || prop == C::NextLine {
                decision = D::RequireBreakAfter;
                break 'rules;
            }

            // LB6: Do not break before hard line breaks.
            if matches!(prop, C::Mandatory | C::CarriageReturn | C::LineFeed | C::NextLine) {
                break 'rules;
            }

            // LB7: Do not break before spaces or zero width space.
            if prop == C::Space || prop == C::ZeroWidthSpace {
                break 'rules;
            }

            // LB8: Break before any character following a zero-width space,
            // even if one or more spaces intervene.
            if self.runs.contains(RunFlags::ZERO_WIDTH_SPACE) && prop != C::Space {
                decision = D::AllowBreakBefore;
                break 'rules;
            }

            // LB8a: Do not break after a zero width joiner.
            if last == Some(C::ZeroWidthJoiner) {
                break 'rules;
            }

            // LB9: Do not break a combining character sequence; treat it as
            // if it has the class of the base character in the rules below.
            // Treat ZWJ as if it were CM.
            if prop == C::CombiningMark || prop == C::ZeroWidthJoiner {
                if let Some(last_prop) = last {
                    if !matches!(
                        last_prop,
                        C::Mandatory
                            | C::CarriageReturn
                            | C::LineFeed
                            | C::NextLine
                            | C::Space
                            | C::ZeroWidthSpace
                    ) {
                        prop = last_prop;
                        // The mark takes the base's class but must not count
                        // toward regional-indicator parity; pre-flip so the
                        // state update below restores the original parity.
                        if prop == C::RegionalIndicator {
                            self.last_props_were_ri_odd = !self.last_props_were_ri_odd;
                        }
                        break 'rules;
                    }
                }
            }

            // LB10 (treat remaining CM/ZWJ as AL) runs after the chain so it
            // applies even when rules above short-circuit.

            // LB11: Do not break before or after word joiner.
            if last == Some(C::WordJoiner) || prop == C::WordJoiner {
                break 'rules;
            }

            // LB12: Do not break after NBSP and related characters.
            if last == Some(C::NonBreakingGlue) {
                break 'rules;
            }

            // LB12a: Do not break before NBSP and related characters, except
            // after spaces and hyphens.
            if !matches!(last, Some(C::Space | C::After | C::Hyphen)) && prop == C::NonBreakingGlue
            {
                break 'rules;
            }

            // LB13: Do not break before ']' or '!' or ';' or '/', even after
            // spaces.
            if matches!(
                prop,
                C::ClosePunctuation
                    | C::CloseParenthesis
                    | C::Exclamation
                    | C::InfixSeparator
                    | C::Symbol
            ) {
                break 'rules;
            }

            // LB14: Do not break after '[', even after spaces.
            if self.runs.contains(RunFlags::OPEN_BRACKET) && prop != C::Space {
                break 'rules;
            }

            // LB15: Do not break within '"[', even with intervening spaces.
            if self.runs.contains(RunFlags::QUOTATION) && prop == C::OpenPunctuation {
                break 'rules;
            }

            // LB16: Do not break between closing punctuation and a
            // nonstarter, even with intervening spaces.
            if self.runs.contains(RunFlags::CLOSE_PUNCT) && prop == C::NonStarter {
                break 'rules;
            }

            // LB17: Do not break within em-dash pairs, even with intervening
            // spaces.
            if self.runs.contains(RunFlags::DASH) && prop == C::BeforeAndAfter {
                break 'rules;
            }

            // LB18: Break after spaces.
            if last == Some(C::Space) {
                decision = D::AllowBreakBefore;
                break 'rules;
            }

            // LB19: Do not break before or after quotation marks.
            if last == Some(C::Quotation) || prop == C::Quotation {
                break 'rules;
            }

            // LB20: Break before and after unresolved CB.
            if last == Some(C::Contingent) || prop == C::Contingent {
                decision = D::AllowBreakBefore;
                break 'rules;
            }

            // LB21: Do not break before hyphens, small kana, and other
            // non-starters, or after acute accents.
            if matches!(prop, C::After | C::Hyphen | C::NonStarter) || last == Some(C::Before) {
                break 'rules;
            }

            // LB21a: Don't break after Hebrew + hyphen.
            if last_last == Some(C::HebrewLetter) && matches!(last, Some(C::Hyphen | C::After)) {
                break 'rules;
            }

            // LB21b: Don't break between solidus and Hebrew letters.
            if last == Some(C::Symbol) && prop == C::HebrewLetter {
                break 'rules;
            }

            // LB22: Do not break before ellipses.
            if prop == C::Inseparable {
                break 'rules;
            }

            // LB23: Do not break between digits and letters.
            if (matches!(last, Some(C::Alphabetic | C::HebrewLetter)) && prop == C::Numeric)
                || (last == Some(C::Numeric) && matches!(prop, C::Alphabetic | C::HebrewLetter))
            {
                break 'rules;
            }

            // LB23a: Do not break between numeric prefixes and ideographs,
            // or between ideographs and numeric postfixes.
            if (last == Some(C::Prefix)
                && matches!(prop, C::Ideographic | C::EmojiBase | C::EmojiModifier))
                || (matches!(
                    last,
                    Some(C::Ideographic | C::EmojiBase | C::EmojiModifier)
                ) && prop == C::Postfix)
            {
                break 'rules;
            }

            // LB24: Do not break between numeric prefix/postfix and letters,
            // or between letters and prefix/postfix.
            if (matches!(last, Some(C::Prefix | C::Postfix))
                && matches!(prop, C::Alphabetic | C::HebrewLetter))
                || (matches!(last, Some(C::Alphabetic | C::HebrewLetter))
                    && matches!(prop, C::Prefix | C::Postfix))
            {
                break 'rules;
            }

            // LB25: Do not break between the following pairs of classes
            // relevant to numbers (the simple, untailored version).
            if let Some(last_prop) = last {
                if matches!(
                    (last_prop, prop),
                    (
                        C::ClosePunctuation | C::CloseParenthesis | C::Numeric,
                        C::Postfix | C::Prefix
                    ) | (C::Postfix | C::Prefix, C::OpenPunctuation | C::Numeric)
                        | (C::Hyphen | C::InfixSeparator | C::Numeric | C::Symbol, C::Numeric)
                ) {
                    break 'rules;
                }
            }

            // LB26: Do not break a Korean syllable.
            if let Some(last_prop) = last {
                if matches!(
                    (last_prop, prop),
                    (
                        C::HangulLJamo,
                        C::HangulLJamo
                            | C::HangulVJamo
                            | C::HangulLvSyllable
                            | C::HangulLvtSyllable
                    ) | (
                        C::HangulVJamo | C::HangulLvSyllable,
                        C::HangulVJamo | C::HangulTJamo
                    ) | (C::HangulTJamo | C::HangulLvtSyllable, C::HangulTJamo)
                ) {
                    break 'rules;
                }
            }

            // LB27: Treat a Korean syllable block the same as ID.
            if let Some(last_prop) = last {
                if matches!(
                    (last_prop, prop),
                    (
                        C::HangulLJamo
                            | C::HangulVJamo
                            | C::HangulTJamo
                            | C::HangulLvSyllable
                            | C::HangulLvtSyllable,
                        C::Postfix
                    ) | (
                        C::Prefix,
                        C::HangulLJamo
                            | C::HangulVJamo
                            | C::HangulTJamo
                            | C::HangulLvSyllable
                            | C::HangulLvtSyllable
                    )
                ) {
                    break 'rules;
                }
            }

            // LB28: Do not break between alphabetics ("at").
            if matches!(last, Some(C::Alphabetic | C::HebrewLetter))
                && matches!(prop, C::Alphabetic | C::HebrewLetter)
            {
                break 'rules;
            }

            // LB29: Do not break between numeric punctuation and alphabetics
            // ("e.g.").
            if last == Some(C::InfixSeparator)
                && matches!(prop, C::Alphabetic | C::HebrewLetter)
            {
                break 'rules;
            }

            // LB30: Do not break between letters, numbers, or ordinary
            // symbols and non-East-Asian opening or closing parentheses.
            if ((matches!(last, Some(C::Alphabetic | C::HebrewLetter | C::Numeric))
                && prop == C::OpenPunctuation)
                || (last == Some(C::CloseParenthesis)
                    && matches!(prop, C::Alphabetic | C::HebrewLetter | C::Numeric)))
                && !is_east_asian_fwh(r)
            {
                break 'rules;
            }

            // LB30a: Break between two regional indicator symbols if and
            // only if an even number of regional indicators precede the
            // break position.
            if self.last_props_were_ri_odd && prop == C::RegionalIndicator {
                break 'rules;
            }

            // LB30b: Do not break between an emoji base and emoji modifier.
            if last == Some(C::EmojiBase) && prop == C::EmojiModifier {
                break 'rules;
            }

            // LB31: Break everywhere else.
            decision = D::AllowBreakBefore;
        }

        // LB10: treat any remaining combining mark or ZWJ as AL.
        if prop == C::CombiningMark || (prop == C::ZeroWidthJoiner && self.last_prop.is_some()) {
            prop = C::Alphabetic;
        }

        let space = prop == C::Space;
        let old = self.runs;
        let mut runs = RunFlags::empty();
        runs.set(
            RunFlags::ZERO_WIDTH_SPACE,
            prop == C::ZeroWidthSpace || (old.contains(RunFlags::ZERO_WIDTH_SPACE) && space),
        );
        runs.set(
            RunFlags::OPEN_BRACKET,
            prop == C::OpenPunctuation || (old.contains(RunFlags::OPEN_BRACKET) && space),
        );
        runs.set(
            RunFlags::QUOTATION,
            prop == C::Quotation || (old.contains(RunFlags::QUOTATION) && space),
        );
        runs.set(
            RunFlags::CLOSE_PUNCT,
            matches!(prop, C::ClosePunctuation | C::CloseParenthesis)
                || (old.contains(RunFlags::CLOSE_PUNCT) && space),
        );
        runs.set(
            RunFlags::DASH,
            prop == C::BeforeAndAfter || (old.contains(RunFlags::DASH) && space),
        );
        self.runs = runs;
        self.last_last_prop = self.last_prop;
        self.last_prop = Some(prop);
        self.last_props_were_ri_odd =
            prop == C::RegionalIndicator && !self.last_props_were_ri_odd;
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisions(s: &str) -> Vec<LineBreakDecision> {
        let mut breaker = LineBreaker::new();
        s.chars().map(|r| breaker.process_rune(r)).collect()
    }

    use LineBreakDecision::{AllowBreakBefore, NoBreak, RequireBreakAfter, RequireBreakBefore};

    #[test]
    fn test_no_break_inside_word() {
        assert_eq!(decisions("ab"), vec![AllowBreakBefore, NoBreak]);
    }

    #[test]
    fn test_break_after_space() {
        assert_eq!(
            decisions("a b"),
            vec![AllowBreakBefore, NoBreak, AllowBreakBefore]
        );
    }

    #[test]
    fn test_hard_break_on_line_feed() {
        assert_eq!(decisions("a\n")[1], RequireBreakAfter);
    }

    #[test]
    fn test_crlf_breaks_once() {
        let d = decisions("a\r\nb");
        assert_eq!(d[1], NoBreak); // CR itself
        assert_eq!(d[2], RequireBreakAfter); // LF completes the pair
    }

    #[test]
    fn test_bare_cr_breaks_before_next() {
        assert_eq!(decisions("a\rb")[2], RequireBreakBefore);
    }

    #[test]
    fn test_no_break_around_quotation() {
        assert_eq!(decisions("x\"y"), vec![AllowBreakBefore, NoBreak, NoBreak]);
    }

    #[test]
    fn test_zero_width_space_allows_break_through_spaces() {
        let d = decisions("a\u{200B}  b");
        assert_eq!(d[4], AllowBreakBefore);
        assert_eq!(&d[1..4], &[NoBreak, NoBreak, NoBreak]);
    }

    #[test]
    fn test_no_break_around_nbsp() {
        assert_eq!(decisions("a\u{00A0}b"), vec![AllowBreakBefore, NoBreak, NoBreak]);
    }

    #[test]
    fn test_no_break_after_open_bracket_through_spaces() {
        let d = decisions("[  x");
        assert_eq!(d[3], NoBreak);
    }

    #[test]
    fn test_no_break_before_close_punctuation() {
        assert_eq!(decisions("a )")[2], NoBreak);
    }

    #[test]
    fn test_numeric_run_stays_together() {
        assert_eq!(decisions("3.14"), vec![AllowBreakBefore, NoBreak, NoBreak, NoBreak]);
    }

    #[test]
    fn test_no_break_before_hyphen() {
        assert_eq!(decisions("well-known")[4], NoBreak);
    }

    #[test]
    fn test_combining_mark_inherits_base_class() {
        assert_eq!(decisions("e\u{0301}x"), vec![AllowBreakBefore, NoBreak, NoBreak]);
    }

    #[test]
    fn test_combining_mark_after_space_is_alphabetic() {
        // LB9 does not apply after a space; the mark falls through to LB18
        // and is then reclassified by LB10.
        let d = decisions("a \u{0301}b");
        assert_eq!(d[2], AllowBreakBefore);
        assert_eq!(d[3], NoBreak); // AL x AL after reclassification
    }

    #[test]
    fn test_regional_indicator_pairs() {
        let d = decisions("🇺🇸🇫🇷");
        assert_eq!(d, vec![AllowBreakBefore, NoBreak, AllowBreakBefore, NoBreak]);
    }

    #[test]
    fn test_zwj_takes_base_class() {
        let d = decisions("👩\u{200D}🚀");
        assert_eq!(d[1], NoBreak); // ZWJ inherits the base class (LB9)
    }

    #[test]
    fn test_em_dash_pair_through_spaces() {
        let d = decisions("x\u{2014} \u{2014}y");
        assert_eq!(d[3], NoBreak); // second dash held by the dash run
    }
}
