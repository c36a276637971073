//! Built-in system templates offered by the template gallery.

use serde::Serialize;

use crate::diagram::DiagramType;

/// Gallery grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Basic,
    Advanced,
    Technical,
    Business,
}

impl TemplateCategory {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateCategory::Basic => "basic",
            TemplateCategory::Advanced => "advanced",
            TemplateCategory::Technical => "technical",
            TemplateCategory::Business => "business",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub diagram_type: DiagramType,
    pub category: TemplateCategory,
    pub description: &'static str,
    pub content: &'static str,
}

impl Template {
    /// Title used for a document started from this template
    pub fn document_title(&self) -> String {
        format!("New {}", self.title)
    }
}

const SYSTEM_TEMPLATES: &[Template] = &[
    Template {
        id: "simple-flowchart",
        title: "Simple Flowchart",
        diagram_type: DiagramType::Flowchart,
        category: TemplateCategory::Basic,
        description: "Input, processing and a single validity check",
        content: "flowchart TD
    Start([Start]) --> Read[/Read input/]
    Read --> Work[Process]
    Work --> Check{Valid?}
    Check -->|Yes| Done[Store result]
    Check -->|No| Fail[Report error]
    Done --> Stop([End])
    Fail --> Stop",
    },
    Template {
        id: "retry-flow",
        title: "Retry Flow",
        diagram_type: DiagramType::Flowchart,
        category: TemplateCategory::Advanced,
        description: "Startup sequence with configuration checks and bounded retries",
        content: "flowchart TD
    Boot([Boot]) --> Cfg[Load configuration]
    Cfg --> CfgOk{Config valid?}
    CfgOk -->|No| CfgErr[Abort]
    CfgOk -->|Yes| Conn[Connect]
    Conn --> ConnOk{Connected?}
    ConnOk -->|No| Again{Attempts < 3?}
    Again -->|Yes| Conn
    Again -->|No| ConnErr[Give up]
    ConnOk -->|Yes| Serve[Serve requests]
    Serve --> Halt([Shutdown])
    CfgErr --> Halt
    ConnErr --> Halt",
    },
    Template {
        id: "login-sequence",
        title: "Login Sequence",
        diagram_type: DiagramType::Sequence,
        category: TemplateCategory::Basic,
        description: "Credential check between client, server and database",
        content: "sequenceDiagram
    actor User
    participant Client
    participant Server
    participant DB
    User->>Client: Enter credentials
    Client->>Server: POST /session
    Server->>DB: Look up user
    DB-->>Server: Password hash
    alt valid
        Server-->>Client: 200 + token
        Client-->>User: Signed in
    else invalid
        Server-->>Client: 401
        Client-->>User: Try again
    end",
    },
    Template {
        id: "class-structure",
        title: "Class Structure",
        diagram_type: DiagramType::Class,
        category: TemplateCategory::Basic,
        description: "Inheritance and composition between a few classes",
        content: "classDiagram
    class Shape {
        +area() float
    }
    class Circle {
        +radius float
    }
    class Canvas {
        +shapes List~Shape~
        +draw()
    }
    Shape <|-- Circle
    Canvas o-- Shape",
    },
    Template {
        id: "blog-schema",
        title: "Blog Schema",
        diagram_type: DiagramType::Er,
        category: TemplateCategory::Basic,
        description: "Authors, posts and comments",
        content: "erDiagram
    AUTHOR ||--o{ POST : writes
    POST ||--o{ COMMENT : receives
    AUTHOR {
        uuid id
        string name
    }
    POST {
        uuid id
        string title
        text body
    }
    COMMENT {
        uuid id
        text body
    }",
    },
    Template {
        id: "order-states",
        title: "Order States",
        diagram_type: DiagramType::State,
        category: TemplateCategory::Technical,
        description: "Lifecycle of an order from cart to delivery",
        content: "stateDiagram-v2
    [*] --> Cart
    Cart --> Placed: checkout
    Placed --> Paid: payment ok
    Placed --> Cancelled: timeout
    Paid --> Shipped
    Shipped --> Delivered
    Delivered --> [*]
    Cancelled --> [*]",
    },
    Template {
        id: "release-plan",
        title: "Release Plan",
        diagram_type: DiagramType::Gantt,
        category: TemplateCategory::Business,
        description: "Three-phase release timeline",
        content: "gantt
    title Release plan
    dateFormat YYYY-MM-DD
    section Design
    Spec           :a1, 2024-01-01, 10d
    section Build
    Implementation :a2, after a1, 20d
    Testing        :a3, after a2, 7d
    section Ship
    Release        :milestone, after a3, 0d",
    },
    Template {
        id: "branching",
        title: "Branching Workflow",
        diagram_type: DiagramType::Gitgraph,
        category: TemplateCategory::Technical,
        description: "Feature branch merged back into main",
        content: "gitGraph
    commit
    branch feature
    checkout feature
    commit
    commit
    checkout main
    merge feature
    commit",
    },
    Template {
        id: "usage-share",
        title: "Usage Share",
        diagram_type: DiagramType::Pie,
        category: TemplateCategory::Business,
        description: "Proportions as a pie chart",
        content: "pie title Editor usage
    \"Terminal\" : 45
    \"Desktop\" : 35
    \"Web\" : 20",
    },
    Template {
        id: "onboarding-journey",
        title: "Onboarding Journey",
        diagram_type: DiagramType::Journey,
        category: TemplateCategory::Business,
        description: "How a new user feels through sign-up",
        content: "journey
    title Onboarding
    section Sign up
      Find the site: 4: User
      Create account: 3: User
    section First use
      Open a template: 5: User
      Share a diagram: 4: User",
    },
    Template {
        id: "topic-map",
        title: "Topic Map",
        diagram_type: DiagramType::Mindmap,
        category: TemplateCategory::Basic,
        description: "Mind map around a central topic",
        content: "mindmap
  root((Diagrams))
    Flow
      Flowchart
      State
    Structure
      Class
      ER
    Time
      Gantt
      Journey",
    },
];

/// All built-in templates in gallery order
pub fn system_templates() -> &'static [Template] {
    SYSTEM_TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static Template> {
    SYSTEM_TEMPLATES.iter().find(|t| t.id == id)
}

pub fn templates_in(category: TemplateCategory) -> impl Iterator<Item = &'static Template> {
    SYSTEM_TEMPLATES.iter().filter(move |t| t.category == category)
}
