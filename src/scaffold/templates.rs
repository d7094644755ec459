//! Bundle skeletons for each [`TemplateType`].
//!
//! Every `scripts/`, `references/` or `assets/` path a SKILL.md body mentions
//! is part of the file set returned by [`render`].

use crate::template::TemplateType;
use crate::util::title_case;
use crate::validator::PLACEHOLDER_MARKER;

/// A file to write into a new bundle, relative to the bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub path: &'static str,
    pub content: String,
    pub executable: bool,
}

impl TemplateFile {
    fn new(path: &'static str, content: impl Into<String>) -> Self {
        Self {
            path,
            content: content.into(),
            executable: false,
        }
    }
}

/// All files for a bundle named `name`, SKILL.md first.
pub fn render(template: TemplateType, name: &str) -> Vec<TemplateFile> {
    let title = title_case(name);
    let fill = |text: &str| text.replace("{name}", name).replace("{title}", &title);

    let (description, body, extra): (&str, &str, Vec<TemplateFile>) = match template {
        TemplateType::KnowledgeRetrieval => (
            "Search, retrieve and cite knowledge from a markdown knowledge base.",
            KNOWLEDGE_RETRIEVAL_BODY,
            vec![
                TemplateFile::new("references/search-patterns.md", fill(SEARCH_PATTERNS)),
                TemplateFile::new("assets/citation-template.md", fill(CITATION_TEMPLATE)),
            ],
        ),
        TemplateType::FrameworkGuidance => (
            "Guide completion of a framework with templates, examples and review.",
            FRAMEWORK_GUIDANCE_BODY,
            vec![
                TemplateFile::new("references/framework-guide.md", fill(FRAMEWORK_GUIDE)),
                TemplateFile::new("references/examples.md", fill(FRAMEWORK_EXAMPLES)),
                TemplateFile::new("assets/templates/blank-template.md", fill(BLANK_TEMPLATE)),
                TemplateFile::new(
                    "assets/templates/annotated-template.md",
                    fill(ANNOTATED_TEMPLATE),
                ),
            ],
        ),
        TemplateType::Translation => (
            "Translate markdown knowledge content while preserving structure, frontmatter and links.",
            TRANSLATION_BODY,
            vec![
                TemplateFile::new("references/translation-patterns.md", fill(TRANSLATION_PATTERNS)),
                TemplateFile::new("references/frontmatter-handling.md", fill(FRONTMATTER_HANDLING)),
                TemplateFile::new("assets/glossary.md", fill(GLOSSARY)),
            ],
        ),
        TemplateType::Generic => (
            "Describe what this skill does and when to use it.",
            GENERIC_BODY,
            vec![TemplateFile::new("assets/example-asset.md", fill(EXAMPLE_ASSET))],
        ),
    };

    let skill_md = format!(
        "---\nname: {}\ndescription: \"{} {}\"\n---\n\n{}",
        name,
        PLACEHOLDER_MARKER,
        description,
        fill(body)
    );

    let mut files = vec![
        TemplateFile::new("SKILL.md", skill_md),
        TemplateFile::new("references/quick-reference.md", fill(QUICK_REFERENCE)),
        TemplateFile {
            executable: true,
            ..TemplateFile::new("scripts/example.sh", fill(EXAMPLE_SCRIPT))
        },
    ];
    files.extend(extra);
    files
}

const QUICK_REFERENCE: &str = "# Quick Reference for {title}

[TODO: Add frequently used patterns, definitions or common examples]
";

const EXAMPLE_SCRIPT: &str = "#!/usr/bin/env bash
# Example helper for {name}. Replace with real automation or delete.
set -euo pipefail

echo \"{name}: nothing to do yet\"
";

const GENERIC_BODY: &str = "# {title}

## Purpose

[TODO: State clearly what this skill helps accomplish]

## When to Use This Skill

[TODO: List the scenarios that should activate this skill]

## Resource Organization

- **Scripts**: `scripts/example.sh` (replace with real automation)
- **References**: `references/quick-reference.md`
- **Assets**: `assets/example-asset.md`

## Progressive Disclosure

- **Metadata**: name and description, always available (~100 tokens)
- **This file**: loaded when the skill triggers (under 5000 words)
- **References**: loaded on demand
- **Assets**: used without loading into context

## Core Capabilities

### 1. [TODO: Capability name]

[TODO: Describe the capability in imperative form]

**Process:**
1. [TODO: First step]
2. [TODO: Second step]

## Usage Patterns

### Pattern 1: [TODO: Common use case]

**Scenario:** [TODO: Describe the scenario]

**Workflow:**
1. [TODO: Step]

## Token Budget

| Operation | Estimated Tokens | Loading Strategy |
|-----------|------------------|------------------|
| Metadata scan | ~100 | Always loaded |
| SKILL.md body | ~1000 | Loaded when triggered |
| Quick reference | ~300 | On demand |

## Version

**Skill Version**: 1.0.0
";

const KNOWLEDGE_RETRIEVAL_BODY: &str = "# {title}

## Purpose

Retrieve and interpret knowledge from a markdown repository about [TODO: domain]. Answer with source citations and point to related content.

## When to Use This Skill

- Questions about [TODO: domain topics]
- Requests for information from [TODO: knowledge base name]
- Exploring related concepts or documents
- Keywords: [TODO: list trigger keywords]

## Resource Organization

- **Scripts**: `scripts/example.sh` for indexing or maintenance tasks
- **References**: `references/quick-reference.md` and `references/search-patterns.md`
- **Assets**: `assets/citation-template.md`

## Progressive Disclosure

- **Metadata**: name and description, always available (~100 tokens)
- **This file**: loaded when a knowledge question is detected (under 5000 words)
- **References**: loaded per topic as queried
- **Assets**: citation formats used without loading into context

## Core Capabilities

### 1. Search the Knowledge Base

1. Extract key concepts and search terms from the query
2. Search by full text, tags and wikilinks
3. Rank matching documents and sections by relevance
4. Pull the pertinent passages from the top results

### 2. Navigate the Link Graph

1. Collect wikilinks and tags in the current document
2. Resolve them to files in the knowledge base
3. Follow backlinks and forward links for context
4. Suggest related topics from the graph structure

### 3. Cite Sources

1. Track the file and section behind every statement
2. Format citations with `assets/citation-template.md`
3. Keep the provenance chain for synthesized answers

## Usage Patterns

### Pattern 1: Direct Question

**Scenario:** A question like \"What is [TODO: key concept]?\"

**Workflow:**
1. Identify search terms
2. Search and read the top documents
3. Synthesize an answer from several sources
4. Cite every source and suggest related concepts

### Pattern 2: Topic Exploration

**Scenario:** A request for everything about [TODO: topic]

**Workflow:**
1. Find the main documents for the topic
2. Walk the link graph for subtopics
3. Present an overview with deep-dive paths

## Token Budget

| Operation | Estimated Tokens | Loading Strategy |
|-----------|------------------|------------------|
| Metadata scan | ~100 | Always loaded |
| SKILL.md body | ~2000-2500 | Loaded when knowledge queries are detected |
| Quick lookup | ~500-1000 | Single document section |
| Standard query | ~1000-1500 | 2-3 documents |
| Deep research | ~2000-3000 | Many documents |
| Reference files | ~500-1500 each | Loaded per topic |

## Notes

[TODO: Describe linking conventions, tagging system and folder layout]

## Version

**Skill Version**: 1.0.0
";

const SEARCH_PATTERNS: &str = "# Search Patterns for {title}

## Full Text

[TODO: Effective keywords and phrasings for this knowledge base]

## Tags

[TODO: List the main tags and what they cover]

## Links

[TODO: Hub documents worth starting from]
";

const CITATION_TEMPLATE: &str = "# Citation Template

> [quoted or paraphrased passage]

Source: `<path/to/document.md>`, section \"<heading>\"
";

const FRAMEWORK_GUIDANCE_BODY: &str = "# {title}

## Purpose

Help apply [TODO: framework name] to a specific organizational context: provide templates, guide completion section by section, and review finished work.

## When to Use This Skill

- Mentions of \"[TODO: framework name]\" or related keywords
- Requests for templates or worksheets
- Help with [TODO: framework purpose]

## Resource Organization

- **Scripts**: `scripts/example.sh` for template generation or checks
- **References**: `references/framework-guide.md`, `references/examples.md`, `references/quick-reference.md`
- **Assets**: `assets/templates/blank-template.md` and `assets/templates/annotated-template.md`

## Progressive Disclosure

- **Metadata**: name and description, always available (~100 tokens)
- **This file**: loaded when framework keywords are detected (under 5000 words)
- **References**: framework guides loaded per section
- **Assets**: templates handed out without loading into context

## Core Capabilities

### 1. Deliver Templates

1. Determine whether a blank or annotated template fits
2. Provide it from `assets/templates/`
3. Explain its purpose briefly and offer guided completion

### 2. Guide Interactive Completion

1. Present one section at a time with its intent
2. Ask clarifying questions about the context
3. Offer relevant examples from `references/examples.md`
4. Summarize completed sections periodically

### 3. Review Completed Work

1. Check every required element is present
2. Assess clarity and specificity
3. Suggest concrete refinements

## Usage Patterns

### Pattern 1: Blank Start

**Scenario:** A request to begin the framework from scratch

**Workflow:**
1. Deliver the blank template
2. Walk through it one section at a time
3. Review the finished draft

### Pattern 2: Existing Draft

**Scenario:** A partially completed framework shared for feedback

**Workflow:**
1. Compare the draft against `references/framework-guide.md`
2. Point out missing or vague sections
3. Offer examples from `references/examples.md`

## Token Budget

| Operation | Estimated Tokens | Loading Strategy |
|-----------|------------------|------------------|
| Metadata scan | ~100 | Always loaded |
| SKILL.md body | ~2000-2500 | Loaded when framework keywords are detected |
| Template delivery | ~200-500 | From assets |
| Guided completion | ~1500-2500 | Interactive session |
| Reference guides | ~1000-2000 each | Loaded per section |

## Notes

[TODO: Framework origin, typical adaptations, related frameworks]

## Version

**Skill Version**: 1.0.0
";

const FRAMEWORK_GUIDE: &str = "# {title} Framework Guide

## Overview

[TODO: Theory and intent of the framework]

## Sections

[TODO: One subsection per framework element with guiding questions]
";

const FRAMEWORK_EXAMPLES: &str = "# {title} Examples

[TODO: Completed examples from different contexts]
";

const BLANK_TEMPLATE: &str = "# [TODO: Framework name]

## Section 1

## Section 2
";

const ANNOTATED_TEMPLATE: &str = "# [TODO: Framework name] (annotated)

## Section 1

> [TODO: Guidance for this section]

## Section 2

> [TODO: Guidance for this section]
";

const TRANSLATION_BODY: &str = "# {title}

## Purpose

Translate markdown knowledge base content between languages while preserving markdown syntax, YAML frontmatter, cross-references and document structure.

## When to Use This Skill

- Requests to translate markdown documents
- A target language or language code is named
- Maintaining a multilingual knowledge base

## Resource Organization

- **Scripts**: `scripts/example.sh` for batch translation or link updates
- **References**: `references/translation-patterns.md` and `references/frontmatter-handling.md`
- **Assets**: `assets/glossary.md`

## Progressive Disclosure

- **Metadata**: name and description, always available (~100 tokens)
- **This file**: loaded when translation is requested (under 5000 words)
- **References**: loaded as specific translation issues arise
- **Assets**: glossary consulted without loading whole documents

## Core Capabilities

### 1. Markdown-Aware Translation

1. Separate translatable prose from markup
2. Keep code blocks, URLs and identifiers unchanged
3. Translate the prose and rebuild the original structure

### 2. Frontmatter Preservation

1. Translate `title` and `description` only
2. Keep tags, dates and identifiers unchanged
3. Add `lang` and links to the other translations

### 3. Cross-Reference Management

1. Find wikilinks, markdown links and hashtags
2. Point links at translated documents when they exist
3. Keep links to the original otherwise

## Usage Patterns

### Pattern 1: Single Document

**Scenario:** A request to translate one document

**Workflow:**
1. Split frontmatter from the body
2. Translate the prose with the glossary at hand
3. Rebuild the document and update its links

### Pattern 2: Whole Folder

**Scenario:** A request to translate a directory of documents

**Workflow:**
1. List documents and their cross-references
2. Translate each document
3. Rewrite links so they point at the translated files

## Token Budget

| Operation | Estimated Tokens | Loading Strategy |
|-----------|------------------|------------------|
| Metadata scan | ~100 | Always loaded |
| SKILL.md body | ~1500-2000 | Loaded when translation is requested |
| Single document | ~1000-2000 | Depends on document size |
| Batch translation | ~2000-4000 | Many documents |

## Notes

[TODO: Supported languages and terminology conventions]

## Version

**Skill Version**: 1.0.0
";

const TRANSLATION_PATTERNS: &str = "# Translation Patterns

[TODO: Common translation scenarios and how to handle them]
";

const FRONTMATTER_HANDLING: &str = "# Frontmatter Handling

| Field | Action |
|-------|--------|
| title | translate |
| description | translate |
| tags | keep |
| date | keep |
| lang | set to the target language |
";

const GLOSSARY: &str = "# Glossary

| Term | Translation | Notes |
|------|-------------|-------|
| [TODO] | | |
";

const EXAMPLE_ASSET: &str = "# Example Asset for {title}

[TODO: Replace with an output-ready file such as a template or checklist]
";
