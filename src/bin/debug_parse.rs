use jsx_lint::parser::{Dialect, JsxParser};
use jsx_lint::syntax::{Node, NodeKind};
use jsx_lint::Linter;

fn main() {
    let (source, dialect) = match std::env::args().nth(1) {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let source = std::fs::read_to_string(&path).expect("Failed to read file");
            let dialect = Dialect::from_path(&path).unwrap_or(Dialect::Javascript);
            (source, dialect)
        }
        None => (SAMPLE.to_string(), Dialect::Javascript),
    };

    let tree = match JsxParser::new(dialect).parse(&source) {
        Ok(tree) => tree,
        Err(e) => {
            println!("Parse failed: {}", e);
            return;
        }
    };

    println!("Parse successful!");
    println!("\nComments:");
    for comment in tree.comments() {
        println!("  [{}..{}] {:?}", comment.span.start, comment.span.end, comment.body);
    }

    println!("\nJSX tree:");
    for root in tree.roots() {
        print_tree(root, 0);
    }

    println!("\nReports:");
    match Linter::default().lint(&tree) {
        Ok(reports) => {
            for report in reports {
                let fix = report
                    .fix
                    .as_ref()
                    .map(|f| format!("{:?}", f.replacement))
                    .unwrap_or_else(|| "none".to_string());
                println!(
                    "  [{}..{}] {} fix={}",
                    report.range.start, report.range.end, report.reason, fix
                );
            }
        }
        Err(e) => println!("  {}", e),
    }
}

const SAMPLE: &str = r#"/** @jsx React.createElement */
const List = ({ items }) => (
  <ul>
    <>{items.map(item => <li key={item.id}>{item.label}</li>)}</>
  </ul>
);

const Title = () => (
  <React.Fragment>
    <h1>Hello</h1>
  </React.Fragment>
);
"#;

fn print_tree(node: Node<'_>, indent: usize) {
    let span = node.span();
    let range = format!("[{}..{}]", span.start, span.end);
    let prefix = "  ".repeat(indent);

    let label = match node.kind() {
        NodeKind::Element(element) => format!("element <{}>", element.name),
        NodeKind::Fragment(_) => "fragment".to_string(),
        NodeKind::Text(raw) => {
            let preview: String = raw.chars().take(30).collect();
            format!("text \"{}\"", preview.replace('\n', "\\n"))
        }
        NodeKind::ExpressionContainer => "container".to_string(),
        NodeKind::EmptyExpression => "empty".to_string(),
        NodeKind::Other(kind) => format!("({})", kind),
    };
    println!("{}{} {}", prefix, label, range);

    for child in node.children() {
        print_tree(child, indent + 1);
    }
}
