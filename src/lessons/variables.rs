//! "Variables": what a variable is, where it lives in memory, and how C,
//! Java, Python and JavaScript differ.

use super::palette::*;
use super::*;
use crate::layout::{bounds_of, surrounding};
use std::f32::consts::FRAC_PI_2;

const UP: Vec2 = Vec2::UP;
const DOWN: Vec2 = Vec2::DOWN;
const LEFT: Vec2 = Vec2::LEFT;
const RIGHT: Vec2 = Vec2::RIGHT;

/// Narration clips and where they start, in seconds
const NARRATION: [(&str, f32); 7] = [
    ("voices/voice-variables-01.mp3", 0.0),
    ("voices/voice-variables-02.mp3", 47.0),
    ("voices/voice-variables-03.mp3", 98.0),
    ("voices/voice-variables-04.mp3", 125.0),
    ("voices/voice-variables-05.mp3", 152.0),
    ("voices/voice-variables-06.mp3", 182.0),
    ("voices/voice-variables-07.mp3", 215.0),
];

pub(super) fn script() -> VideoScript {
    let mut builder = ScriptBuilder::new("Variables")
        .description("What a variable really is: names, memory, the stack and the heap");
    for (index, (source, offset)) in NARRATION.iter().enumerate() {
        builder = builder.cue(format!("voice-{:02}", index + 1), *source, *offset);
    }

    let mut stage = SegmentBuilder::new("stage");
    stage.add([backdrop("bg", &[BLUE_E, TEAL_D], 0.9)]);

    builder
        .stage(stage)
        .segment(intro())
        .segment(memory())
        .segment(stack_and_heap())
        .segment(c_language())
        .segment(java())
        .segment(python())
        .segment(javascript())
        .segment(summary())
        .build()
}

fn intro() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("intro").titled("The most fundamental concept");

    let title = bold_text("intro-title", "The most fundamental concept\n in programming", 0.6, "Optima");
    s.then(play([type_with_cursor(title.clone()).rate(RateFunc::Linear)]));

    let dot = rounded_rect("dot", 5.5, 3.8, 0.5).colored(YELLOW_B);
    let underline = next_to(line("underline", LEFT, RIGHT).colored(GOLD), &title, DOWN, 0.25);
    let variable = styled_text("variable", "Variable", 0.75, Some("Optima"), false);
    s.then(play([replacement_transform("intro-title", variable), create(underline)]).run_time(2.5));

    s.then(
        play([
            draw_border_then_fill(dot.clone()),
            animate("underline", AttrPatch::default().shift(UP * 0.25).scale(0.8)),
        ])
        .lag(0.2)
        .run_time(1.5),
    );

    let caption = next_to(
        styled_text("intro-caption", "A name that holds some value", 0.35, Some("Futura"), false),
        &dot,
        DOWN,
        0.25,
    );
    s.then(
        play([
            transform_from_copy("variable", caption),
            animate("underline", AttrPatch::default().opacity(0.0)),
        ])
        .run_time(3.0),
    );

    let logo = next_to(
        image("python-logo", "assets/python-logo-removebg-preview.png", 1.8, 1.8),
        &dot,
        LEFT,
        0.4,
    );
    let assignment = text("assignment", "x = 10", 0.75);
    s.then(
        play([
            grow_from_center(logo),
            fade_out("intro-caption"),
            fade_out("underline"),
            replacement_transform("variable", assignment),
            transform("dot", &circle("dot", 2.5).colored(YELLOW)).run_time(1.5),
        ])
        .run_time(2.5)
        .rate(RateFunc::Linear),
    );
    s.wait(4.0);

    s.then(play([fade_out("python-logo")]));

    // Concentric layers around the dot, innermost first
    let layers: Vec<ObjectSpec> = [(2.8, BLUE_E), (3.3, TEAL_D), (3.8, PURPLE_B)]
        .into_iter()
        .enumerate()
        .map(|(i, (radius, color))| circle(&format!("layer-{i}"), radius).colored(color).stroke(2.0))
        .collect();
    s.then(play([transform("dot", &layers[0])]).run_time(2.0));
    s.then(play(layers[1..].iter().cloned().map(create)).lag(0.3).run_time(2.0));
    s.then(play([flash("layer-2", YELLOW, 1.5)]).run_time(1.2));
    s.wait(1.0);

    s.group("layers", &["layer-1", "layer-2"]);
    s.then(play(fade_out_all(&["layers", "assignment", "dot"])));
    s
}

fn memory() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("memory").titled("A label for a spot in memory");

    let container = rounded_rect("container", 2.5, 1.5, 0.2).colored(TEAL).at(LEFT * 3.0);
    let label = next_to(bold_text("label-x", "x", 0.4, "Optima"), &container, UP, 0.25);
    let value = styled_text("value", "10", 0.45, Some("Futura"), false).at(LEFT * 3.0);
    s.then(play([draw_border_then_fill(container.clone()), fade_in(label)]).run_time(1.5));
    s.then(play([write(value)]).run_time(1.2));

    let cell = square("cell", 0.5).colored(GREY).filled(0.1);
    let cells = grid("memory", &cell, 40, 5, 8, 0.15).at(RIGHT * 3.0);
    s.then(play([fade_in_from(cells.clone(), RIGHT * 2.0, 1.0)]).run_time(2.0));

    let target = &cells.children[18];
    let link = line("link", edge(&container, RIGHT), edge(target, LEFT)).colored(YELLOW);
    s.then(play([create(link)]).run_time(1.2));

    s.then(play([animate(
        &target.id,
        AttrPatch::default().color(YELLOW).fill_opacity(0.6),
    )]));
    s.then(play([indicate(&target.id, TEAL_B)]));

    let stored = styled_text("memory-value", "10", 0.3, Some("Futura"), false).at(child_center(&cells, 18));
    s.then(play([write(stored)]));

    s.group(
        "world",
        &["container", "label-x", "value", "memory", "link", "memory-value"],
    );
    s.then(play([animate("world", AttrPatch::default().scale(1.25))]).run_time(2.0));

    let subtitle = to_edge(
        styled_text(
            "memory-subtitle",
            "A variable is just a label connected to a spot in memory",
            0.3,
            Some("Futura"),
            false,
        )
        .colored(BLUE_B),
        DOWN,
        0.5,
    );
    s.then(play([write(subtitle)]).run_time(2.0));
    s.wait(4.0);

    s.then(play(fade_out_all(&["world", "memory-subtitle"])));
    s.wait(6.0);
    s
}

fn stack_and_heap() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("stack-heap").titled("The stack and the heap");

    s.then(play([fade_in(backdrop("backdrop-stack-heap", &[PURPLE_E, BLUE_E, TEAL_D], 0.85))]).run_time(1.5));

    let stack_title = to_edge(bold_text("stack-title", "STACK", 0.45, "Optima").colored(YELLOW_B), Vec2::UL, 1.0);
    let heap_title = to_edge(bold_text("heap-title", "HEAP", 0.45, "Optima").colored(TEAL_B), Vec2::UR, 1.0);
    s.then(play([write(stack_title.clone()), write(heap_title.clone())]).run_time(1.5));

    let cell = square("cell", 0.5).colored(GREY).filled(0.1);
    let stack = shifted(
        next_to(grid("stack", &cell, 20, 5, 4, 0.1), &stack_title, DOWN, 0.5),
        RIGHT * 0.5,
    );
    let heap = shifted(
        next_to(grid("heap", &cell, 20, 5, 4, 0.1), &heap_title, DOWN, 0.5),
        LEFT * 0.5,
    );
    s.stagger_in(&[&stack, &heap], |c| fade_in_from(c, DOWN * 0.5, 1.0), 0.05, 2.5);

    let stack_border = surrounding("stack-border", bounds_of(&stack), 0.2).colored(YELLOW).stroke(2.0);
    let heap_border = surrounding("heap-border", bounds_of(&heap), 0.2).colored(TEAL_A).stroke(2.0);
    s.then(play([create(stack_border), create(heap_border)]));

    // Stack: what lives there, then a pile of plates
    let stack_text = styled_text(
        "stack-text",
        "Local variables\nFunction calls\nFixed size data",
        0.6,
        Some("Avenir"),
        false,
    )
    .colored(LOGO_WHITE);
    s.then(play([fade_in(stack_text.clone())]).run_time(2.0));
    let stack_note = next_to(stack_text.scaled(0.5), &stack, DOWN, 0.2);
    s.then(play([transform("stack-text", &stack_note)]).run_time(2.0));

    let plate = |id: &str| rect(id, 1.0, 0.5).colored(YELLOW_B).filled(0.8);
    let plate1 = plate("plate-1").at(bounds_of(&stack).center());
    let plate2 = next_to(plate("plate-2"), &plate1, UP, 0.0);
    let plate3 = next_to(plate("plate-3"), &plate2, UP, 0.0);
    for p in [plate1, plate2, plate3] {
        s.then(play([fade_in_from(p, UP, 1.0)]).run_time(1.8));
    }

    // Last in, first out
    s.then(play([indicate("plate-3", YELLOW_E)]).run_time(2.0));
    s.then(play([fade_out_to("plate-3", UP, 1.0)]).run_time(1.8));
    s.then(play([indicate("plate-2", YELLOW_E)]).run_time(2.0));

    // Heap: dynamic allocations scattered over the region
    let heap_text = styled_text("heap-text", "Objects\nArrays\nDynamic data", 0.6, Some("Avenir"), false)
        .colored(LOGO_WHITE);
    s.then(play([fade_in(heap_text.clone())]).run_time(2.0));
    let heap_note = next_to(heap_text.scaled(0.5), &heap, DOWN, 0.2);
    s.then(play([transform("heap-text", &heap_note)]).run_time(2.0));

    let allocations = [
        ("heap-obj-1", 1.0, 0.6, TEAL_B, 6),
        ("heap-obj-2", 1.3, 0.8, BLUE_B, 14),
        ("heap-obj-3", 0.8, 0.8, PURPLE_B, 16),
    ];
    for (id, width, height, color, slot) in allocations {
        let object = rounded_rect(id, width, height, 0.2)
            .colored(color)
            .filled(0.7)
            .at(child_center(&heap, slot));
        s.then(play([grow_from_center(object)]).run_time(1.8));
    }
    s.then(play([flash("heap-obj-2", TEAL, 1.2)]).run_time(1.0));

    let subtitle = to_edge(
        styled_text(
            "stack-heap-subtitle",
            "Stack → Fast, small, short-lived\nHeap → Flexible, larger, slower",
            0.3,
            Some("Futura"),
            false,
        ),
        DOWN,
        0.5,
    );
    s.then(play([write(subtitle)]).run_time(3.5));
    s.wait(2.0);

    s.then(
        play(fade_out_all(&[
            "stack",
            "heap",
            "stack-border",
            "heap-border",
            "plate-1",
            "plate-2",
            "heap-obj-1",
            "heap-obj-2",
            "heap-obj-3",
            "stack-heap-subtitle",
            "backdrop-stack-heap",
        ]))
        .run_time(2.0),
    );

    // Bring the two descriptions to the centre, titles beside them
    let stack_center = stack_note.scaled(1.5).at(UP);
    let heap_center = heap_note.scaled(1.5).at(DOWN);
    s.then(
        play([
            transform("stack-text", &stack_center),
            transform("heap-text", &heap_center),
        ])
        .run_time(2.0),
    );
    s.then(
        play([
            transform("stack-title", &next_to(stack_title.scaled(1.5), &stack_center, LEFT, 0.3)),
            transform("heap-title", &next_to(heap_title.scaled(1.5), &heap_center, RIGHT, 0.3)),
        ])
        .run_time(2.0),
    );
    s.wait(2.0);

    s.then(play(fade_out_all(&["stack-text", "heap-text", "stack-title", "heap-title"])));
    s.wait(2.0);
    s
}

/// Title, code listing and stack/heap regions shared by the language segments
struct Board {
    prefix: &'static str,
    code: ObjectSpec,
    stack: ObjectSpec,
    heap: ObjectSpec,
}

impl Board {
    fn code_line(&self, index: usize) -> String {
        format!("{}-code-{}", self.prefix, index)
    }

    fn stack_slot(&self, index: usize) -> Vec2 {
        child_center(&self.stack, index)
    }

    fn heap_slot(&self, index: usize) -> Vec2 {
        child_center(&self.heap, index)
    }
}

/// Set the scene for one language: backdrop, title, code, memory regions
#[allow(clippy::too_many_arguments)]
fn open_board(
    s: &mut SegmentBuilder,
    prefix: &'static str,
    backdrop_colors: &[Color],
    title: ObjectSpec,
    lines: &[&str],
    code_size: f32,
    code_buff: f32,
    code_lag: f32,
    stack_grid: (usize, usize, usize),
    heap_grid: (usize, usize, usize),
    stack_border_color: Color,
) -> Board {
    s.then(play([fade_in(backdrop(&format!("backdrop-{prefix}"), backdrop_colors, 0.9))]).run_time(1.5));
    s.then(play([write(title)]).run_time(1.5));

    let code = to_edge(
        column(
            &format!("{prefix}-code"),
            lines
                .iter()
                .enumerate()
                .map(|(i, line)| super::code(&format!("{prefix}-code-{i}"), line, code_size))
                .collect(),
            code_buff,
        ),
        LEFT,
        1.2,
    );
    s.stagger_in(&[&code], |l| fade_in_from(l, RIGHT, 1.0), code_lag, 3.0);

    let cell = square("cell", 0.5).colored(GREY).filled(0.35);
    let region = |id: String, (count, rows, cols): (usize, usize, usize), offset: Vec2| {
        shifted(to_edge(grid(&id, &cell, count, rows, cols, 0.1), RIGHT, 2.0), offset)
    };
    let stack = region(format!("{prefix}-stack"), stack_grid, UP * 2.0);
    let heap = region(format!("{prefix}-heap"), heap_grid, DOWN * 1.5);
    let stack_border = surrounding(format!("{prefix}-stack-border"), bounds_of(&stack), 0.2)
        .colored(stack_border_color)
        .stroke(2.0);
    let heap_border = surrounding(format!("{prefix}-heap-border"), bounds_of(&heap), 0.2)
        .colored(TEAL_A)
        .stroke(2.0);
    s.then(
        play([
            create(stack.clone()),
            create(heap.clone()),
            create(stack_border),
            create(heap_border),
        ])
        .run_time(2.0),
    );

    Board {
        prefix,
        code,
        stack,
        heap,
    }
}

/// Highlight a line of code, then grow its stack reference and heap object
/// and draw the arrow between them. Returns the arrow id.
fn reference(
    s: &mut SegmentBuilder,
    board: &Board,
    line: usize,
    color: Color,
    on_stack: ObjectSpec,
    on_heap: ObjectSpec,
) -> String {
    let arrow_id = format!("{}-arrow", on_stack.id);
    let pointer = arrow(&arrow_id, edge(&on_stack, DOWN), edge(&on_heap, UP), 0.1).colored(WHITE);
    s.then(play([indicate(&board.code_line(line), color)]).run_time(1.5));
    s.then(play([grow_from_center(on_stack), grow_from_center(on_heap)]).run_time(2.0));
    s.then(play([create(pointer)]).run_time(1.0));
    arrow_id
}

fn subtitle(id: &str, content: &str, size: f32) -> ObjectSpec {
    to_edge(styled_text(id, content, size, Some("Futura"), false).colored(WHITE), DOWN, 0.5)
}

fn language_title(id: &str, content: &str, size: f32) -> ObjectSpec {
    to_edge(bold_text(id, content, size, "Futura").colored(LOGO_WHITE), UP, 0.6)
}

/// Fade out every object the board and the segment put on stage
fn close_board(s: &mut SegmentBuilder, board: &Board, extra: &[&str]) {
    let prefix = board.prefix;
    let mut targets = vec![
        board.code.id.clone(),
        board.stack.id.clone(),
        board.heap.id.clone(),
        format!("{prefix}-stack-border"),
        format!("{prefix}-heap-border"),
        format!("{prefix}-title"),
        format!("{prefix}-subtitle"),
        format!("backdrop-{prefix}"),
    ];
    targets.extend(extra.iter().map(|t| t.to_string()));
    let targets: Vec<&str> = targets.iter().map(String::as_str).collect();
    s.then(play(fade_out_all(&targets)).run_time(2.0));
}

fn c_language() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("c").titled("C: you manage the heap");
    let board = open_board(
        &mut s,
        "c",
        &[BLACK, BLUE_E, GREY_E],
        language_title("c-title", "C Language", 0.6),
        &["int x = 5;", "int* p = malloc(sizeof(int));", "*p = 20;", "free(p);"],
        0.35,
        0.25,
        0.2,
        (12, 3, 4),
        (16, 4, 4),
        YELLOW_B,
    );

    // int x = 5; lives on the stack
    let x = tag("c-x", "x:5", 0.8, 0.6, YELLOW_D).at(board.stack_slot(5));
    s.then(play([indicate(&board.code_line(0), GREEN_C)]).run_time(1.5));
    s.then(play([grow_from_center(x)]).run_time(2.0));
    s.then(play([flash("c-x", GREEN_C, 0.8)]).run_time(1.0));

    // malloc hands out a heap block
    let block_at = board.heap_slot(10);
    let block = tag("c-malloc", "p → ?", 1.0, 0.7, TEAL_B).at(block_at);
    s.then(play([indicate(&board.code_line(1), TEAL_B)]).run_time(1.5));
    s.then(play([grow_from_center(block)]).run_time(2.0));

    let assigned = tag("c-malloc", "p → 20", 1.0, 0.7, TEAL_B).at(block_at);
    s.then(play([indicate(&board.code_line(2), TEAL_B)]).run_time(1.5));
    s.then(play([transform("c-malloc-label", &assigned.children[1])]).run_time(2.0));

    // free(p)
    s.then(play([indicate(&board.code_line(3), RED)]).run_time(1.5));
    s.then(play([fade_out_to("c-malloc", DOWN, 1.0)]).run_time(2.0));

    s.then(
        play([write(subtitle(
            "c-subtitle",
            "C → Stack for simple vars\nHeap for malloc (must free yourself)",
            0.3,
        ))])
        .run_time(2.5),
    );

    close_board(&mut s, &board, &["c-x"]);
    s
}

fn java() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("java").titled("Java: references to heap objects");
    let title = shifted(language_title("java-title", "Java Language", 0.5), LEFT * 0.5);
    let board = open_board(
        &mut s,
        "java",
        &[BLACK, PURPLE_E, BLUE_E],
        title,
        &["int x = 10;", "String s = \"Hello\";", "MyClass obj = new MyClass();"],
        0.3,
        0.25,
        0.2,
        (12, 3, 6),
        (18, 4, 6),
        YELLOW_B,
    );

    // Primitives stay on the stack
    let x = tag("java-x", "x:10", 0.8, 0.6, YELLOW_D).at(board.stack_slot(0));
    s.then(play([indicate(&board.code_line(0), GREEN_C)]).run_time(1.5));
    s.then(play([grow_from_center(x)]).run_time(2.0));
    s.then(play([flash("java-x", GREEN_C, 0.8)]).run_time(1.0));

    let string_arrow = reference(
        &mut s,
        &board,
        1,
        BLUE_B,
        tag("java-s", "s → ?", 1.1, 0.6, BLUE_B).at(board.stack_slot(2)),
        tag("java-hello", "\"Hello\"", 1.4, 0.8, TEAL_B).at(board.heap_slot(1)),
    );
    let object_arrow = reference(
        &mut s,
        &board,
        2,
        ORANGE,
        tag("java-obj", "obj → ?", 1.1, 0.6, PURPLE_B).at(board.stack_slot(4)),
        tag("java-instance", "MyClass{}", 1.5, 1.0, ORANGE).at(board.heap_slot(10)),
    );

    s.then(
        play([
            flash(&string_arrow, YELLOW, 1.2),
            flash(&object_arrow, YELLOW, 1.2),
        ])
        .run_time(1.0),
    );
    s.then(
        play([write(subtitle(
            "java-subtitle",
            "Java → Primitives on stack\nObjects live in heap, stack stores references",
            0.3,
        ))])
        .run_time(1.5),
    );

    close_board(
        &mut s,
        &board,
        &[
            "java-x",
            "java-s",
            "java-hello",
            "java-obj",
            "java-instance",
            string_arrow.as_str(),
            object_arrow.as_str(),
        ],
    );
    s
}

fn python() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("python").titled("Python: everything is an object");
    let board = open_board(
        &mut s,
        "python",
        &[BLACK, BLUE_D, TEAL_D],
        language_title("python-title", "Python Language", 0.55),
        &["x = 10", "s = \"Hello\"", "arr = [1, 2, 3]"],
        0.325,
        0.3,
        0.25,
        (8, 2, 4),
        (20, 5, 4),
        YELLOW_B,
    );

    let bindings = [
        ("x", "x → ?", 1.1, YELLOW_D, 0, "10 (int)", 1.2, 0.7, TEAL_B, 0, YELLOW_B),
        ("s", "s → ?", 1.1, BLUE_B, 2, "\"Hello\"", 1.5, 0.8, PURPLE_B, 6, BLUE_B),
        ("arr", "arr → ?", 1.2, ORANGE, 4, "[1,2,3]", 2.5, 1.0, GREEN_B, 12, ORANGE),
    ];
    let mut arrows = Vec::new();
    let mut placed = Vec::new();
    for (line, (name, label, width, fill, slot, value, value_w, value_h, value_fill, heap_slot, highlight)) in
        bindings.into_iter().enumerate()
    {
        let name_id = format!("python-{name}");
        let value_id = format!("python-{name}-value");
        arrows.push(reference(
            &mut s,
            &board,
            line,
            highlight,
            tag(&name_id, label, width, 0.6, fill).at(board.stack_slot(slot)),
            tag(&value_id, value, value_w, value_h, value_fill).at(board.heap_slot(heap_slot)),
        ));
        placed.extend([name_id, value_id]);
    }

    s.then(play(arrows.iter().map(|a| flash(a, YELLOW, 1.2))).run_time(1.5));
    s.then(
        play([write(subtitle(
            "python-subtitle",
            "Python → Everything is an object\nVariables are references pointing to heap",
            0.3,
        ))])
        .run_time(2.0),
    );
    s.wait(3.0);

    let extra: Vec<&str> = placed.iter().chain(arrows.iter()).map(String::as_str).collect();
    close_board(&mut s, &board, &extra);
    s
}

fn javascript() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("javascript").titled("JavaScript: scope and closures");
    let board = open_board(
        &mut s,
        "js",
        &[BLACK, BLUE_D, TEAL_E],
        language_title("js-title", "JavaScript Language", 0.5),
        &["var a = 10;", "let b = 20;", "const c = 30;", "function foo() { let x = 5; }"],
        0.3,
        0.25,
        0.2,
        (14, 2, 7),
        (16, 4, 4),
        YELLOW,
    );
    s.wait(1.0);

    let declarations = [
        ("js-a", "a:10", 0.75, 0.5, YELLOW_D, 0, YELLOW_B, 1.0),
        ("js-b", "b:20", 0.9, 0.6, BLUE_B, 2, BLUE_B, 1.0),
        ("js-c", "c:30 (const)", 1.0, 0.6, PURPLE_B, 8, PURPLE_B, 3.0),
    ];
    for (line, (id, label, width, height, fill, slot, highlight, pause)) in declarations.into_iter().enumerate() {
        let binding = tag(id, label, width, height, fill).at(board.stack_slot(slot));
        s.then(play([indicate(&board.code_line(line), highlight), grow_from_center(binding)]).run_time(2.0));
        s.wait(pause);
    }

    // A function call pushes a frame; its closure survives on the heap
    let call = tag("js-foo", "foo()", 1.4, 0.5, TEAL_B).at(board.stack_slot(12));
    let closure = tag("js-closure", "Closure env", 1.75, 0.8, TEAL_B).at(board.heap_slot(10));
    let pointer = arrow("js-closure-arrow", edge(&call, DOWN), edge(&closure, UP), 0.1).colored(WHITE);
    s.then(play([indicate(&board.code_line(3), TEAL_B), grow_from_center(call)]).run_time(2.0));
    s.then(play([grow_from_center(closure), create(pointer)]).run_time(2.0));

    s.then(
        play([write(subtitle(
            "js-subtitle",
            "JavaScript → var (function scoped), let/const (block scoped)\nClosures keep variables alive in the heap",
            0.2,
        ))])
        .run_time(4.5),
    );
    s.wait(2.0);

    close_board(
        &mut s,
        &board,
        &["js-a", "js-b", "js-c", "js-foo", "js-closure", "js-closure-arrow"],
    );
    s
}

fn summary() -> SegmentBuilder {
    let mut s = SegmentBuilder::new("summary").titled("Across languages");

    s.then(
        play([fade_in_from(
            backdrop("backdrop-summary", &[BLACK, BLUE_E, TEAL_D], 0.9),
            Vec2::ZERO,
            1.2,
        )])
        .run_time(1.0),
    );

    let core = to_edge(
        bold_text("core-text", "Across languages,\nthe core idea is the same –", 0.3, "Avenir Next").colored(YELLOW),
        UP,
        1.0,
    );
    s.then(
        play([
            fade_in_from(core.clone(), UP, 0.8),
            animate("core-text", AttrPatch::default().color(WHITE)),
        ])
        .run_time(2.0),
    );
    s.wait(2.0);
    s.then(play([transform("core-text", &core.colored(WHITE).scaled(0.55).at(Vec2::ZERO))]).run_time(2.0));

    // The variable as a glowing orb
    let orb = circle("orb", 1.8).colored(TEAL_A).stroke(8.0);
    let glow = circle("orb-glow", 1.8).colored(TEAL).stroke(0.0).filled(0.4);
    s.then(play([
        create(orb).run_time(1.0),
        fade_in_from(glow, Vec2::ZERO, 1.5).run_time(2.5),
    ]));
    s.then(
        play([animate("orb-glow", AttrPatch::default().scale(1.1).fill_opacity(0.6))])
            .rate(RateFunc::ThereAndBack)
            .run_time(3.5),
    );

    // Keywords in orbit around the orb
    let words: Vec<ObjectSpec> = [
        ("Automatic", BLUE_A),
        ("Manual", PURPLE_A),
        ("Value", GREEN_A),
        ("Reference", RED_A),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (word, color))| {
        let angle = i as f32 * FRAC_PI_2;
        styled_text(&format!("keyword-{}", word.to_lowercase()), word, 0.4, Some("Futura"), false)
            .colored(color)
            .at(Vec2::new(angle.cos(), angle.sin()) * 3.0)
    })
    .collect();
    let keywords = ObjectSpec::group("keywords", words);
    s.stagger_in(&[&keywords], |k| fade_in_from(k, Vec2::ZERO, 0.5), 0.4, 2.5);
    s.wait(1.5);

    s.then(
        play([animate(
            "orb",
            AttrPatch::default().scale(1.1).color(TEAL_B).stroke_width(10.0),
        )])
        .run_time(2.0),
    );
    s.wait(1.5);

    s.then(
        play(fade_out_all(&[
            "core-text",
            "orb",
            "orb-glow",
            "keywords",
            "backdrop-summary",
        ]))
        .run_time(2.0),
    );
    s
}
