use std::io::Write;

use controllers::{
    FileBuffer, GenerateError, GenerateWarning, GeneratorConfig, MemoryBuffer, TextBuffer,
    generate, generate_into,
};
use kv2::document::Document;
use kv2::parser::Parser;
use kv2::{COMBINATION_INPUT_CONTROL, SIGNATURE};

const HEADER: &[&str] = &[
    SIGNATURE,
    "\"DmeCombinationOperator\"",
    "{",
    "\t\"id\" \"elementid\" \"00000000-0000-0000-0000-000000000001\"",
    "\t\"name\" \"string\" \"combinationOperator\"",
    "\t\"controls\" \"element_array\"",
];

fn control(id: &str, name: &str) -> Vec<String> {
    vec![
        "\t\t\t\"DmeCombinationInputControl\"".to_string(),
        "\t\t\t{".to_string(),
        format!("\t\t\t\t\"id\" \"elementid\" \"{}\"", id),
        format!("\t\t\t\t\"name\" \"string\" \"{}\"", name),
        "\t\t\t\t\"rawControlNames\" \"string_array\"".to_string(),
        "\t\t\t\t[".to_string(),
        format!("\t\t\t\t\t\"{}\"", name),
        "\t\t\t\t]".to_string(),
        "\t\t\t\t\"stereo\" \"bool\" \"0\"".to_string(),
        "\t\t\t\t\"eyelid\" \"bool\" \"0\"".to_string(),
        "\t\t\t},".to_string(),
    ]
}

/// An ID source listing one control per name, ids `id-<name>`.
fn id_source(names: &[&str]) -> String {
    let mut lines: Vec<String> = HEADER.iter().map(|l| l.to_string()).collect();
    lines.push("\t\t[".to_string());
    for name in names {
        lines.extend(control(&format!("id-{}", name), name));
    }
    lines.push("\t\t]".to_string());
    lines.push("\t\t\"controlValues\" \"vector3_array\" [ ]".to_string());
    lines.push("\t}".to_string());
    lines.push("}".to_string());
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn combinations() -> String {
    [
        "<!-- dmx encoding keyvalues2 1 format model 1 -->",
        "\"DmeCombinationOperator\"",
        "{",
        "\t\"controls\" \"element_array\"",
        "\t\t[",
        "\t\t\t\"DmeCombinationInputControl\"",
        "\t\t\t{",
        "\t\t\t\t\"id\" \"elementid\" \"aux-close\"",
        "\t\t\t\t\"name\" \"string\" \"CloseLid\"",
        "\t\t\t\t\"rawControlNames\" \"string_array\"",
        "\t\t\t\t[",
        "\t\t\t\t\t\"CloseLid\",",
        "\t\t\t\t\t\"CloseLidUp\",",
        "\t\t\t\t\t\"lid--negZ\"",
        "\t\t\t\t]",
        "\t\t\t\t\"stereo\" \"bool\" \"1\"",
        "\t\t\t\t\"eyelid\" \"bool\" \"1\"",
        "\t\t\t\t\"wrinkleScales\" \"float_array\"",
        "\t\t\t\t[",
        "\t\t\t\t\t\"0\",",
        "\t\t\t\t\t\"0\",",
        "\t\t\t\t\t\"0\"",
        "\t\t\t\t]",
        "\t\t\t},",
        "\t\t\t\"DmeCombinationInputControl\"",
        "\t\t\t{",
        "\t\t\t\t\"id\" \"elementid\" \"aux-missing\"",
        "\t\t\t\t\"name\" \"string\" \"Pucker\"",
        "\t\t\t\t\"rawControlNames\" \"string_array\"",
        "\t\t\t\t[",
        "\t\t\t\t\t\"Pucker\"",
        "\t\t\t\t]",
        "\t\t\t}",
        "\t\t]",
        "\t}",
        "}",
    ]
    .join("\n")
}

fn run(names: &[&str], aux: Option<&str>) -> controllers::Generation {
    let source = Document::from_source(&id_source(names), 0);
    let aux = aux.map(|text| Document::from_source(text, 1));
    generate(Some(&source), aux.as_ref(), &GeneratorConfig::default()).expect("generation failed")
}

/// Parse the generated document back into its control blocks.
fn output_blocks(generation: &controllers::Generation) -> Vec<kv2::block::Block> {
    let doc = Document::from_lines(generation.lines.iter().cloned(), 9);
    Parser::new(&doc)
        .parse_blocks(COMBINATION_INPUT_CONTROL)
        .expect("output parses")
}

fn placeholder_count(generation: &controllers::Generation, field: &str) -> usize {
    let prefix = format!("\t\t\"{}\" \"vector3_array\" [", field);
    let line = generation
        .lines
        .iter()
        .find(|l| l.starts_with(&prefix))
        .expect("value array line");
    line.matches("\"0.0 0.0 0.5\"").count()
}

#[test]
fn header_is_copied_verbatim() {
    let generation = run(&["smile", "frown"], None);
    for (i, expected) in HEADER.iter().enumerate() {
        assert_eq!(&generation.lines[i], expected);
    }
    assert_eq!(generation.lines[HEADER.len()], "\t\t[");
}

#[test]
fn block_count_matches_blocks_and_placeholders() {
    let generation = run(
        &["CloseLid", "CloseLidUp", "lid--negZ", "brow--negY", "brow--posY", "smile"],
        Some(&combinations()),
    );
    let blocks = output_blocks(&generation);
    assert_eq!(generation.block_count, 3);
    assert_eq!(blocks.len(), generation.block_count);
    assert_eq!(placeholder_count(&generation, "controlValues"), 3);
    assert_eq!(placeholder_count(&generation, "controlValuesLagged"), 3);
    assert_eq!(generation.stages.grouped, 1);
    assert_eq!(generation.stages.scale_pairs, 1);
    assert_eq!(generation.stages.fallbacks, 1);
}

#[test]
fn every_index_name_is_covered_exactly_once() {
    let names = [
        "CloseLid",
        "CloseLidUp",
        "lid--negZ",
        "lid--posZ",
        "brow--negY",
        "brow--posY",
        "cheek--negX",
        "lip--posX",
        "smile",
    ];
    let generation = run(&names, Some(&combinations()));
    let blocks = output_blocks(&generation);

    // Fallback blocks write rawControlNames inline, which reads back as a `[name]` scalar.
    let mut covered: Vec<String> = Vec::new();
    for block in &blocks {
        match block.array("rawControlNames") {
            Some(items) => covered.extend(items.iter().cloned()),
            None => covered.push(
                block
                    .scalar("rawControlNames")
                    .expect("inline names")
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .to_string(),
            ),
        }
    }
    for name in names {
        assert_eq!(
            covered.iter().filter(|c| c.as_str() == name).count(),
            1,
            "{} should appear exactly once",
            name
        );
    }
}

/// An auxiliary document with one record per member list; the first member names the record.
fn grouped_records(records: &[&[&str]]) -> String {
    let mut lines: Vec<String> = HEADER.iter().map(|l| l.to_string()).collect();
    lines.push("\t\t[".to_string());
    for (i, members) in records.iter().enumerate() {
        lines.push("\t\t\t\"DmeCombinationInputControl\"".to_string());
        lines.push("\t\t\t{".to_string());
        lines.push(format!("\t\t\t\t\"id\" \"elementid\" \"aux-{}\"", i));
        lines.push(format!("\t\t\t\t\"name\" \"string\" \"{}\"", members[0]));
        lines.push("\t\t\t\t\"rawControlNames\" \"string_array\"".to_string());
        lines.push("\t\t\t\t[".to_string());
        let items: Vec<String> = members
            .iter()
            .map(|m| format!("\t\t\t\t\t\"{}\"", m))
            .collect();
        lines.push(items.join(",\n"));
        lines.push("\t\t\t\t]".to_string());
        lines.push("\t\t\t},".to_string());
    }
    lines.push("\t\t]".to_string());
    lines.push("\t}".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

#[test]
fn overlapping_records_claim_each_name_once() {
    let aux = grouped_records(&[&["CloseLid", "CloseLidUp"], &["CloseLidUp"]]);
    let generation = run(&["CloseLid", "CloseLidUp"], Some(&aux));
    let blocks = output_blocks(&generation);

    assert_eq!(generation.block_count, 1);
    assert_eq!(generation.stages.grouped, 1);
    assert_eq!(generation.stages.fallbacks, 0);
    assert_eq!(placeholder_count(&generation, "controlValues"), 1);
    let covered: Vec<&String> = blocks
        .iter()
        .flat_map(|b| b.array("rawControlNames").unwrap_or_default())
        .collect();
    for name in ["CloseLid", "CloseLidUp"] {
        assert_eq!(
            covered.iter().filter(|c| c.as_str() == name).count(),
            1,
            "{} should appear exactly once",
            name
        );
    }
}

#[test]
fn id_source_with_inline_arrays_is_accepted() {
    let mut lines: Vec<String> = HEADER.iter().map(|l| l.to_string()).collect();
    lines.push("\t\t[".to_string());
    for (id, name) in [("id-a", "brow--negY"), ("id-b", "brow--posY"), ("id-c", "smile")] {
        lines.push("\t\t\t\"DmeCombinationInputControl\"".to_string());
        lines.push("\t\t\t{".to_string());
        lines.push(format!("\t\t\t\t\"id\" \"elementid\" \"{}\"", id));
        lines.push(format!("\t\t\t\t\"name\" \"string\" \"{}\"", name));
        lines.push(format!("\t\t\t\t\"rawControlNames\" \"string_array\" [ \"{}\" ]", name));
        lines.push("\t\t\t\t\"wrinkleScales\" \"float_array\" [ \"0.0\" ]".to_string());
        lines.push("\t\t\t\t\"dominators\" \"element_array\" [ ]".to_string());
        lines.push("\t\t\t},".to_string());
    }
    lines.push("\t\t]".to_string());
    lines.push("\t}".to_string());
    lines.push("}".to_string());
    let source = Document::from_source(&lines.join("\n"), 0);

    let generation =
        generate(Some(&source), None, &GeneratorConfig::default()).expect("generation failed");
    let blocks = output_blocks(&generation);

    assert_eq!(generation.block_count, 2);
    let names: Vec<&str> = blocks.iter().filter_map(|b| b.name()).collect();
    assert_eq!(names, vec!["brow--scaleY", "smile"]);
    assert_eq!(blocks[0].id(), Some("id-a"));
    assert_eq!(blocks[1].id(), Some("id-c"));
}

#[test]
fn scale_pairs_are_merged_and_leftovers_fall_back() {
    let generation = run(&["brow--negY", "brow--posY", "cheek--negX"], None);
    let blocks = output_blocks(&generation);
    let names: Vec<&str> = blocks.iter().filter_map(|b| b.name()).collect();
    assert_eq!(names, vec!["brow--scaleY", "cheek--negX"]);
    assert_eq!(blocks[0].id(), Some("id-brow--negY"));
    assert_eq!(
        blocks[0].array("rawControlNames"),
        Some(&["brow--negY".to_string(), "brow--posY".to_string()][..])
    );
    assert_eq!(blocks[1].id(), Some("id-cheek--negX"));
}

#[test]
fn grouped_record_is_rewritten_with_index_id() {
    let generation = run(&["lid--posZ", "CloseLid", "lid--negZ"], Some(&combinations()));
    let blocks = output_blocks(&generation);

    let grouped = &blocks[0];
    assert_eq!(grouped.name(), Some("CloseLid"));
    assert_eq!(grouped.id(), Some("id-CloseLid"));
    assert_eq!(grouped.scalar("eyelid"), Some("1"));
    assert_eq!(grouped.array("wrinkleScales").map(<[String]>::len), Some(3));

    // lid--negZ was claimed by the group, so lid--posZ is an orphan.
    let names: Vec<&str> = blocks.iter().filter_map(|b| b.name()).collect();
    assert_eq!(names, vec!["CloseLid", "lid--posZ"]);
}

#[test]
fn emitted_text_layout() {
    let generation = run(&["a--negX", "a--posX", "smile"], None);
    let text = generation.text();
    let expected_blocks = "\t\t[\n\
        \t\t\t\"DmeCombinationInputControl\"\n\
        \t\t\t{\n\
        \t\t\t\t\"id\" \"elementid\" \"id-a--negX\"\n\
        \t\t\t\t\"name\" \"string\" \"a--scaleX\"\n\
        \t\t\t\t\"rawControlNames\" \"string_array\"\n\
        \t\t\t\t[\n\
        \t\t\t\t\t\"a--negX\",\n\
        \t\t\t\t\t\"a--posX\"\n\
        \t\t\t\t]\n\
        \t\t\t\t\"stereo\" \"bool\" \"0\"\n\
        \t\t\t\t\"eyelid\" \"bool\" \"0\"\n\
        \t\t\t\t\"wrinkleScales\" \"float_array\"\n\
        \t\t\t\t[\n\
        \t\t\t\t\t\"0\",\n\
        \t\t\t\t\t\"0\"\n\
        \t\t\t\t]\n\
        \t\t\t},\n\
        \t\t\t\"DmeCombinationInputControl\"\n\
        \t\t\t{\n\
        \t\t\t\t\"id\" \"elementid\" \"id-smile\"\n\
        \t\t\t\t\"name\" \"string\" \"smile\"\n\
        \t\t\t\t\"rawControlNames\" \"string_array\" [\"smile\"]\n\
        \t\t\t\t\"stereo\" \"bool\" \"0\"\n\
        \t\t\t\t\"eyelid\" \"bool\" \"0\"\n\
        \t\t\t\t\"wrinkleScales\" \"float_array\" [\"0.0\"]\n\
        \t\t\t},\n\
        \t\t]\n\
        \t\t\"controlValues\" \"vector3_array\" [\"0.0 0.0 0.5\", \"0.0 0.0 0.5\"]\n\
        \t\t\"controlValuesLagged\" \"vector3_array\" [\"0.0 0.0 0.5\", \"0.0 0.0 0.5\"]\n\
        \t\t\"usesLaggedValues\" \"bool\" \"0\"\n\
        \t\t\"dominators\" \"element_array\" [ ]\n\
        \t\t\"targets\" \"element_array\" [ ]\n\
        \t}\n\
        }\n";
    assert!(text.ends_with(expected_blocks), "unexpected output:\n{}", text);
}

#[test]
fn missing_id_source() {
    let result = generate(None, None, &GeneratorConfig::default());
    assert!(matches!(result, Err(GenerateError::MissingIdSource)));
}

#[test]
fn unterminated_auxiliary_block_aborts() {
    let source = Document::from_source(&id_source(&["smile"]), 0);
    let aux = Document::from_source(
        "\"DmeCombinationInputControl\"\n{\n\"id\" \"elementid\" \"x\"\n",
        1,
    );
    let mut destination = MemoryBuffer::from_text(format!("{}\nold\n", SIGNATURE));
    let result = generate_into(
        &mut destination,
        Some(&source),
        Some(&aux),
        &GeneratorConfig::default(),
    );
    match result {
        Err(GenerateError::Parse(err)) => {
            assert_eq!(err.kind, kv2::parser::ParseErrorKind::UnterminatedBlock);
            assert_eq!(err.file_id, 1);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
    assert_eq!(destination.text(), format!("{}\nold\n", SIGNATURE));
}

#[test]
fn malformed_control_block_aborts_without_writing() {
    let text = format!(
        "{}\n\"DmeCombinationOperator\"\n{{\n\t\"controls\" \"element_array\"\n\t\t[\n\
         \t\t\t\"DmeCombinationInputControl\"\n\t\t\t{{\n\t\t\t\t\"id\" \"elementid\" \"1\"\n\t\t\t}}\n",
        SIGNATURE
    );
    let source = Document::from_source(&text, 0);
    let mut destination = MemoryBuffer::new();
    let result = generate_into(&mut destination, Some(&source), None, &GeneratorConfig::default());
    assert!(matches!(
        result,
        Err(GenerateError::MalformedControlBlock { field: "name", .. })
    ));
    assert!(result.unwrap_err().to_diagnostic().is_some());
    assert_eq!(destination.text(), "");
}

#[test]
fn foreign_destination_is_left_untouched() {
    let source = Document::from_source(&id_source(&["smile"]), 0);
    let mut destination = MemoryBuffer::from_text("import bpy\nprint('hi')\n");
    let result = generate_into(&mut destination, Some(&source), None, &GeneratorConfig::default());
    match result {
        Err(GenerateError::NotAControllerDocument { first_line }) => {
            assert_eq!(first_line, "import bpy");
        }
        other => panic!("expected NotAControllerDocument, got {:?}", other),
    }
    assert_eq!(destination.text(), "import bpy\nprint('hi')\n");
}

#[test]
fn rerun_into_same_destination_is_identical() {
    let source = Document::from_source(&id_source(&["a--negX", "a--posX", "smile"]), 0);
    let aux_text = combinations();
    let aux = Document::from_source(&aux_text, 1);
    let config = GeneratorConfig::default();

    let mut destination = MemoryBuffer::new();
    let first = generate_into(&mut destination, Some(&source), Some(&aux), &config)
        .expect("first run");
    let after_first = destination.text().to_string();
    let second = generate_into(&mut destination, Some(&source), Some(&aux), &config)
        .expect("second run");

    assert_eq!(destination.text(), after_first);
    assert_eq!(first, second);
}

#[test]
fn soft_limit_is_a_warning() {
    let names: Vec<String> = (0..5).map(|i| format!("shape{}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let source = Document::from_source(&id_source(&refs), 0);
    let config = GeneratorConfig {
        soft_limit: 4,
        ..GeneratorConfig::default()
    };

    let generation = generate(Some(&source), None, &config).expect("generation failed");

    assert_eq!(generation.block_count, 5);
    assert_eq!(
        generation.warnings,
        vec![GenerateWarning::SoftLimitExceeded { count: 5, limit: 4 }]
    );
    assert_eq!(generation.summary(), "Generated 5 controllers (4 supported)");
}

#[test]
fn file_destination_round_trip() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let source_path = dir.path().join("model.dmx");
    let mut file = std::fs::File::create(&source_path).unwrap();
    write!(file, "{}", id_source(&["jaw--negY", "jaw--posY"])).unwrap();

    let source_text = std::fs::read_to_string(&source_path).unwrap();
    let source = Document::from_source(&source_text, 0);
    let mut destination = FileBuffer::new(dir.path().join("model-new.dmx"));

    let generation = generate_into(&mut destination, Some(&source), None, &GeneratorConfig::default())
        .expect("generation failed");

    let written = std::fs::read_to_string(destination.path()).unwrap();
    assert_eq!(written, generation.text());
    assert!(destination.lines().unwrap()[0] == SIGNATURE);
    assert_eq!(generation.block_count, 1);
}
