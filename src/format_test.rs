use super::*;

// =============================================================================
// inline constructs
// =============================================================================

#[test]
fn bold_becomes_strong() {
    assert_eq!(format_message("**x**"), "<strong>x</strong>");
}

#[test]
fn inline_code_becomes_code() {
    assert_eq!(format_message("`x`"), "<code>x</code>");
}

#[test]
fn italic_becomes_em() {
    assert_eq!(format_message("an *important* note"), "an <em>important</em> note");
}

#[test]
fn bold_and_italic_on_one_line() {
    assert_eq!(format_message("**Hours** are *flexible*"), "<strong>Hours</strong> are <em>flexible</em>");
}

#[test]
fn unmatched_bold_is_literal() {
    assert_eq!(format_message("**x"), "**x");
    assert_eq!(format_message("a ** b"), "a ** b");
}

#[test]
fn unmatched_backtick_is_literal() {
    assert_eq!(format_message("say `hi"), "say `hi");
}

#[test]
fn inline_code_is_not_reformatted() {
    assert_eq!(format_message("`**not bold**`"), "<code>**not bold**</code>");
}

#[test]
fn link_opens_in_new_context() {
    assert_eq!(
        format_message("[Book a call](https://example.com/book)"),
        "<a href=\"https://example.com/book\" target=\"_blank\" rel=\"noopener noreferrer\">Book a call</a>"
    );
}

#[test]
fn link_with_script_scheme_renders_label_only() {
    assert_eq!(format_message("[click](javascript:alert(1))"), "click)");
}

#[test]
fn relative_link_is_allowed() {
    assert!(format_message("[contact](/contact)").contains("href=\"/contact\""));
}

#[test]
fn asterisks_in_url_stay_in_url() {
    assert_eq!(
        format_message("[docs](https://example.com/*v1*/guide)"),
        "<a href=\"https://example.com/*v1*/guide\" target=\"_blank\" rel=\"noopener noreferrer\">docs</a>"
    );
}

#[test]
fn link_label_is_formatted_inside_the_anchor() {
    assert_eq!(
        format_message("[**Fees**](/fees)"),
        "<a href=\"/fees\" target=\"_blank\" rel=\"noopener noreferrer\"><strong>Fees</strong></a>"
    );
    assert_eq!(
        format_message("[`cfg`](/docs)"),
        "<a href=\"/docs\" target=\"_blank\" rel=\"noopener noreferrer\"><code>cfg</code></a>"
    );
}

#[test]
fn bold_around_link_nests_cleanly() {
    assert_eq!(
        format_message("**see [this](/a)**"),
        "<strong>see <a href=\"/a\" target=\"_blank\" rel=\"noopener noreferrer\">this</a></strong>"
    );
}

#[test]
fn italic_never_straddles_bold() {
    assert_eq!(format_message("**a *b** c*"), "<strong>a *b</strong> c*");
    assert_eq!(format_message("***x***"), "<strong>*x</strong>*");
}

#[test]
fn italic_may_wrap_whole_bold_span() {
    assert_eq!(format_message("*a **b** c*"), "<em>a <strong>b</strong> c</em>");
}

#[test]
fn bracket_without_url_is_literal() {
    assert_eq!(format_message("[draft] notes"), "[draft] notes");
}

// =============================================================================
// block constructs
// =============================================================================

#[test]
fn three_list_lines_share_one_container() {
    let html = format_message("- one\n- two\n- three");
    assert_eq!(html, "<ul><li>one</li><li>two</li><li>three</li></ul>");
    assert_eq!(html.matches("<ul>").count(), 1);
    assert_eq!(html.matches("<li>").count(), 3);
}

#[test]
fn separate_list_runs_get_separate_containers() {
    let html = format_message("- a\n- b\nbetween\n- c");
    assert_eq!(html, "<ul><li>a</li><li>b</li></ul>between<ul><li>c</li></ul>");
}

#[test]
fn list_after_intro_line_drops_extra_break() {
    let html = format_message("We offer:\n- mediation\n- custody");
    assert_eq!(html, "We offer:<ul><li>mediation</li><li>custody</li></ul>");
}

#[test]
fn headers_map_to_levels_two_to_four() {
    assert_eq!(format_message("# Top"), "<h2>Top</h2>");
    assert_eq!(format_message("## Mid"), "<h3>Mid</h3>");
    assert_eq!(format_message("### Low"), "<h4>Low</h4>");
}

#[test]
fn four_hashes_are_not_a_header() {
    assert_eq!(format_message("#### nope"), "#### nope");
}

#[test]
fn hash_without_space_is_not_a_header() {
    assert_eq!(format_message("#1 choice"), "#1 choice");
}

#[test]
fn header_only_at_line_start() {
    assert_eq!(format_message("see ## this"), "see ## this");
}

#[test]
fn header_swallows_adjacent_breaks() {
    assert_eq!(format_message("## Fees\nFlat rate."), "<h3>Fees</h3>Flat rate.");
    assert_eq!(format_message("Intro\n## Fees"), "Intro<h3>Fees</h3>");
}

#[test]
fn horizontal_rule() {
    assert_eq!(format_message("above\n---\nbelow"), "above<hr>below");
}

#[test]
fn fenced_code_is_preserved_verbatim() {
    let html = format_message("Example:\n```text\n**raw** line\n- not a list\n```\nDone");
    assert_eq!(html, "Example:<pre><code>**raw** line\n- not a list</code></pre>Done");
}

#[test]
fn unclosed_fence_is_literal() {
    assert_eq!(format_message("```oops"), "```oops");
}

#[test]
fn plain_newlines_become_breaks() {
    assert_eq!(format_message("line one\nline two"), "line one<br>line two");
}

// =============================================================================
// safety / totality
// =============================================================================

#[test]
fn empty_input_yields_empty_output() {
    assert_eq!(format_message(""), "");
}

#[test]
fn raw_html_is_escaped() {
    assert_eq!(format_message("<script>x</script>"), "&lt;script&gt;x&lt;/script&gt;");
}

#[test]
fn link_url_cannot_break_out_of_attribute() {
    let html = format_message("[x](https://a.test/\"onmouseover=\"y)");
    assert!(!html.contains("\"onmouseover"));
    assert!(html.contains("&quot;onmouseover=&quot;"));
}

#[test]
fn forged_placeholder_is_stripped() {
    assert_eq!(format_message("a\u{0}0\u{0}b"), "a0b");
}

#[test]
fn odd_inputs_do_not_panic() {
    for input in ["*", "**", "***", "`", "``", "```", "[", "[]()", "](", "#", "# ", "- ", "\n\n", "é*ü*"] {
        let _ = format_message(input);
    }
}

#[test]
fn user_text_is_escaped_not_formatted() {
    assert_eq!(render_user_text("**hi** <b>"), "<p>**hi** &lt;b&gt;</p>");
}
