use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::scaffold::SkillScaffolder;
use crate::template::TemplateType;

pub fn run(name: &str, template: &str, path: &str, force: bool) -> Result<()> {
    let template: TemplateType = template.parse()?;
    let outcome = SkillScaffolder::new(path)
        .with_overwrite(force)
        .create(name, template)
        .with_context(|| format!("Failed to create skill '{}'", name))?;

    let verb = if outcome.replaced { "replaced" } else { "created" };
    println!(
        "\n✅ Skill '{}' {} at: {}",
        name,
        verb,
        outcome.root.display()
    );
    println!("   Template: {} ({})", template, template.summary());
    println!("\nDirectory structure:");
    println!("  {}/", name);
    for line in render_tree(&outcome.files) {
        println!("  {}", line);
    }

    let root = outcome.root.display();
    println!("\nNext steps:");
    println!("  1. Edit {}/SKILL.md and replace the [REPLACE BEFORE PACKAGING] description", root);
    println!("  2. Fill in the [TODO] placeholders in the body and references");
    println!("  3. Add reference documents to {}/references/", root);
    println!("  4. Run `skillsmith validate {}`", root);
    println!("  5. Run `skillsmith package {}`\n", root);

    Ok(())
}

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

/// Draw bundle-relative slash paths as a box-drawing tree, SKILL.md first.
fn render_tree(files: &[String]) -> Vec<String> {
    let mut root = Node::default();
    for file in files {
        let mut node = &mut root;
        for segment in file.split('/') {
            node = node.children.entry(segment.to_string()).or_default();
        }
    }
    let mut lines = Vec::new();
    draw(&root, "", &mut lines);
    lines
}

fn draw(node: &Node, prefix: &str, lines: &mut Vec<String>) {
    let mut names: Vec<&String> = node.children.keys().collect();
    // Top-level files before directories
    names.sort_by_key(|n| (!node.children[*n].children.is_empty(), n.to_string()));

    for (i, name) in names.iter().enumerate() {
        let child = &node.children[*name];
        let last = i + 1 == names.len();
        let branch = if last { "└── " } else { "├── " };
        let suffix = if child.children.is_empty() { "" } else { "/" };
        lines.push(format!("{}{}{}{}", prefix, branch, name, suffix));
        let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
        draw(child, &next, lines);
    }
}
