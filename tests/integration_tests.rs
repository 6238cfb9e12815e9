use eir::error::EirError;
use eir::interp::Vm;
use eir::linker::link;
use eir::module::Module;
use eir::parser::parse_module;

/// Run load → link → run on a source string, asserting every stage
/// succeeds, and return the output bytes.
fn run_program(source: &str, stdin: &[u8]) -> Vec<u8> {
    let module = load_and_link(source);
    let mut vm = Vm::new(&module);
    let mut input = stdin;
    let mut output = Vec::new();
    vm.run(&module, &mut input, &mut output)
        .expect("program should run to completion");
    output
}

fn load_and_link(source: &str) -> Module {
    let program = parse_module(source).expect("program should parse");
    link(program).expect("program should link")
}

/// Run the full pipeline on a source string, returning the first error
/// encountered (if any) instead of panicking.
fn try_run(source: &str) -> Result<Vec<u8>, EirError> {
    let program = parse_module(source)?;
    let module = link(program)?;
    let mut vm = Vm::new(&module);
    let mut input: &[u8] = b"";
    let mut output = Vec::new();
    vm.run(&module, &mut input, &mut output)?;
    Ok(output)
}

#[test]
fn minimal_exit_produces_no_output() {
    let out = run_program(".text\nmain:\nexit\n", b"");
    assert!(out.is_empty());
}

#[test]
fn print_a_character() {
    let out = run_program(".text\nmain:\nmov A, 65\nputc A\nexit\n", b"");
    assert_eq!(out, b"A");
}

#[test]
fn memory_round_trip() {
    let src = ".data\n\
        x:\n\
        .long 7\n\
        .text\n\
        main:\n\
        mov B, x\n\
        load A, B\n\
        add A, 1\n\
        store A, B\n\
        load C, B\n\
        putc C\n\
        exit\n";
    let out = run_program(src, b"");
    assert_eq!(out, vec![0x08]);
}

#[test]
fn conditional_jump_and_fall_through() {
    let src = ".text\n\
        main:\n\
        mov A, 3\n\
        mov B, 3\n\
        jeq done, A, B\n\
        mov C, 88\n\
        putc C\n\
        done:\n\
        mov C, 89\n\
        putc C\n\
        exit\n";
    let out = run_program(src, b"");
    assert_eq!(out, b"Y");
}

#[test]
fn string_data_and_edata() {
    let src = ".data\n\
        s:\n\
        .string \"Hi\"\n\
        .text\n\
        main:\n\
        mov A, _edata\n\
        sub A, s\n\
        putc A\n\
        exit\n";
    let out = run_program(src, b"");
    assert_eq!(out, vec![0x03]);
}

#[test]
fn modular_subtraction_wraps_to_word_max() {
    // `eq`/`ne`/.. take exactly two operands (`<reg>, <reg|simm>`); a third
    // trailing operand is not part of the grammar, so the invariant here is
    // checked directly rather than through a three-operand `eq`.
    let src = ".text\n\
        main:\n\
        mov A, 0\n\
        sub A, 1\n\
        mov B, 16777215\n\
        mov C, A\n\
        eq C, B\n\
        putc C\n\
        exit\n";
    let out = run_program(src, b"");
    assert_eq!(out, vec![1]);
}

#[test]
fn three_operand_comparison_is_rejected_as_trailing_token() {
    let err = try_run(".text\nmov A, 0\neq C, A, B\nexit\n");
    assert!(matches!(err, Err(EirError::Parse { .. })));
}

#[test]
fn ordered_data_sections_place_buckets_by_key() {
    let src = ".data 1\n\
        second:\n\
        .long 20\n\
        .data 0\n\
        first:\n\
        .long 10\n\
        .text\n\
        main:\n\
        mov A, first\n\
        mov B, second\n\
        sub B, A\n\
        putc B\n\
        exit\n";
    let out = run_program(src, b"");
    assert_eq!(out, vec![0x01]);
}

#[test]
fn unterminated_string_literal_is_a_parse_error() {
    let err = try_run(".data\ns:\n.string \"unterminated\n.text\nexit\n");
    assert!(matches!(err, Err(EirError::Parse { .. })));
}

#[test]
fn undefined_label_is_a_link_error() {
    let err = try_run(".text\njmp nowhere\n");
    assert!(matches!(err, Err(EirError::Link(_))));
}

#[test]
fn duplicate_label_declaration_is_a_parse_error() {
    let err = try_run(".text\nl:\nexit\nl:\nexit\n");
    assert!(matches!(err, Err(EirError::Parse { .. })));
}

#[test]
fn jump_to_immediate_is_a_parse_error() {
    let err = try_run(".text\njmp 0\n");
    assert!(matches!(err, Err(EirError::Parse { .. })));
}

#[test]
fn out_of_range_program_counter_is_a_runtime_fault() {
    let err = try_run(".text\nmov A, 1\n");
    assert!(matches!(err, Err(EirError::Runtime(_))));
}

#[test]
fn entry_point_follows_main_label_past_setup_code() {
    let src = ".text\n\
        jmp main\n\
        unused:\n\
        mov A, 77\n\
        exit\n\
        main:\n\
        mov A, 65\n\
        putc A\n\
        exit\n";
    let module = load_and_link(src);
    assert_ne!(module.entry, 0);
    let out = run_program(src, b"");
    assert_eq!(out, b"A");
}
