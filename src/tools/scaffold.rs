//! React project scaffolding tools.
//!
//! Generates a Vite + React + Tailwind project tree from a small set of
//! parameters, then installs dependencies. Output is deterministic for
//! identical inputs, apart from the timestamp-suffixed fallback project
//! name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::terminal::run_shell;
use super::Tool;

pub(super) fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CreateReactProject),
        Arc::new(BuildReactProject),
        Arc::new(InstallReactPackage),
    ]
}

const PACKAGE_JSON: &str = r#"{
  "name": "{{PROJECT_NAME}}",
  "private": true,
  "version": "0.1.0",
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "vite build",
    "preview": "vite preview"
  },
  "dependencies": {
    "axios": "^1.6.0",
    "lucide-react": "^0.344.0",
    "react": "^18.2.0",
    "react-dom": "^18.2.0",
    "react-router-dom": "^6.22.0"
  },
  "devDependencies": {
    "@vitejs/plugin-react": "^4.2.0",
    "autoprefixer": "^10.4.0",
    "postcss": "^8.4.0",
    "tailwindcss": "^3.4.0",
    "vite": "^5.1.0"
  }
}
"#;

const VITE_CONFIG: &str = r#"import { defineConfig } from 'vite';
import react from '@vitejs/plugin-react';

export default defineConfig({
  plugins: [react()],
});
"#;

const TAILWIND_CONFIG: &str = r#"/** @type {import('tailwindcss').Config} */
export default {
  content: ['./index.html', './src/**/*.{js,jsx}'],
  theme: {
    extend: {},
  },
  plugins: [],
};
"#;

const POSTCSS_CONFIG: &str = r#"export default {
  plugins: {
    tailwindcss: {},
    autoprefixer: {},
  },
};
"#;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{{APP_NAME}}</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.jsx"></script>
  </body>
</html>
"#;

const MAIN_JSX: &str = r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';
import './index.css';

ReactDOM.createRoot(document.getElementById('root')).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
"#;

const INDEX_CSS: &str = r#"@tailwind base;
@tailwind components;
@tailwind utilities;

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
}
"#;

const APP_JSX: &str = r#"import React, { useState } from 'react';
import Header from './components/Header';
import MainContent from './components/MainContent';
import Sidebar from './components/Sidebar';

function App() {
  const [searchTerm, setSearchTerm] = useState('');

  return (
    <div className="min-h-screen bg-gray-50">
      <Header
        searchTerm={searchTerm}
        onSearchChange={setSearchTerm}
        appName="{{APP_NAME}}"
      />
      <div className="flex">
        <Sidebar />
        <MainContent searchTerm={searchTerm} description="{{DESCRIPTION}}" />
      </div>
    </div>
  );
}

export default App;
"#;

const HEADER_JSX: &str = r#"import React from 'react';
import { Search, Menu, Bell, Settings } from 'lucide-react';

const Header = ({ searchTerm, onSearchChange, appName }) => {
  return (
    <header className="bg-white shadow-sm border-b border-gray-200 px-4 py-3">
      <div className="max-w-7xl mx-auto flex items-center justify-between">
        <div className="flex items-center space-x-2">
          <button className="p-2 hover:bg-gray-100 rounded-lg transition-colors">
            <Menu size={20} className="text-gray-600" />
          </button>
          <div className="w-8 h-8 bg-blue-600 rounded-lg flex items-center justify-center">
            <span className="text-white font-bold text-sm">
              {appName.charAt(0).toUpperCase()}
            </span>
          </div>
          <h1 className="text-xl font-bold text-gray-900">{appName}</h1>
        </div>

        <div className="flex-1 max-w-2xl mx-8">
          <div className="relative">
            <input
              type="text"
              value={searchTerm}
              onChange={(e) => onSearchChange(e.target.value)}
              placeholder="Search..."
              className="w-full px-4 py-2 pl-10 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-blue-500"
            />
            <Search size={20} className="absolute left-3 top-2.5 text-gray-400" />
          </div>
        </div>

        <div className="flex items-center space-x-2">
          <button className="p-2 hover:bg-gray-100 rounded-lg transition-colors">
            <Bell size={20} className="text-gray-600" />
          </button>
          <button className="p-2 hover:bg-gray-100 rounded-lg transition-colors">
            <Settings size={20} className="text-gray-600" />
          </button>
        </div>
      </div>
    </header>
  );
};

export default Header;
"#;

const MAIN_CONTENT_JSX: &str = r#"import React from 'react';

const MainContent = ({ searchTerm, description }) => {
  return (
    <main className="flex-1 p-6">
      <div className="max-w-5xl mx-auto">
        <h2 className="text-2xl font-bold text-gray-900 mb-2">Welcome</h2>
        <p className="text-gray-600 mb-6">{description}</p>
        {searchTerm && (
          <p className="text-sm text-gray-500">Filtering by: {searchTerm}</p>
        )}
        <div className="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
          {/* Content cards go here */}
        </div>
      </div>
    </main>
  );
};

export default MainContent;
"#;

const SIDEBAR_JSX: &str = r##"import React, { useState } from 'react';
import { ChevronLeft, ChevronRight, Home, Folder, Star } from 'lucide-react';

const Sidebar = () => {
  const [collapsed, setCollapsed] = useState(false);

  const items = [
    { icon: Home, label: 'Home' },
    { icon: Folder, label: 'Projects' },
    { icon: Star, label: 'Favorites' },
  ];

  return (
    <aside
      className={`bg-white border-r border-gray-200 transition-all ${
        collapsed ? 'w-16' : 'w-56'
      }`}
    >
      <nav className="p-2 space-y-1">
        {items.map(({ icon: Icon, label }) => (
          <a
            key={label}
            href="#"
            className="flex items-center gap-3 px-3 py-2 rounded-lg text-gray-700 hover:bg-gray-100"
          >
            <Icon size={18} />
            {!collapsed && <span>{label}</span>}
          </a>
        ))}
      </nav>
      <button
        onClick={() => setCollapsed(!collapsed)}
        className="m-2 p-2 rounded-lg hover:bg-gray-100 text-gray-500"
      >
        {collapsed ? <ChevronRight size={16} /> : <ChevronLeft size={16} />}
      </button>
    </aside>
  );
};

export default Sidebar;
"##;

/// Render `package.json` for a project (also used by the scraper's
/// generated projects).
pub(super) fn render_package_json(project_name: &str) -> String {
    PACKAGE_JSON.replace("{{PROJECT_NAME}}", project_name)
}

pub(super) fn render_index_html(app_name: &str) -> String {
    INDEX_HTML.replace("{{APP_NAME}}", app_name)
}

pub(super) const fn vite_config() -> &'static str {
    VITE_CONFIG
}

/// Derive the display name from the app type parameter.
fn app_name_for(app_type: &str) -> String {
    if app_type.is_empty() || app_type == "custom" {
        "My App".to_string()
    } else {
        let mut chars = app_type.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => "My App".to_string(),
        }
    }
}

/// Create a new React project with a modern Vite + Tailwind setup.
pub struct CreateReactProject;

#[derive(Deserialize)]
struct CreateReactProjectArgs {
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default = "default_app_type")]
    app_type: String,
    #[serde(default)]
    description: Option<String>,
}

fn default_app_type() -> String {
    "custom".to_string()
}

#[async_trait]
impl Tool for CreateReactProject {
    fn name(&self) -> &str {
        "create_react_project"
    }

    fn description(&self) -> &str {
        "Create a new React project (Vite, React 18, Tailwind CSS, Lucide icons) in a new folder and install its dependencies. Input: { project_name?, app_type?, description? }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: CreateReactProjectArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for create_react_project: {}", e))?;

        let project_name = args
            .project_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("react-app-{}", chrono::Utc::now().timestamp()));
        let app_name = app_name_for(&args.app_type);
        let description = args.description.unwrap_or_else(|| {
            format!(
                "A modern {} built with React, Tailwind CSS, and best practices.",
                app_name
            )
        });

        let project_dir = workspace.join(&project_name);
        write_project_tree(&project_dir, &project_name, &app_name, &description).await?;

        tracing::info!(project = %project_name, "installing scaffold dependencies");
        let install = run_shell("npm install", &project_dir, 600).await?;
        let install_status = install.lines().next().unwrap_or("").to_string();

        Ok(format!(
            "React project created successfully: {}/\n\n\
             Project structure:\n\
             ├── src/\n\
             │   ├── components/\n\
             │   │   ├── Header.jsx\n\
             │   │   ├── MainContent.jsx\n\
             │   │   └── Sidebar.jsx\n\
             │   ├── App.jsx\n\
             │   ├── index.css\n\
             │   └── main.jsx\n\
             ├── public/\n\
             ├── package.json\n\
             ├── vite.config.js\n\
             ├── tailwind.config.js\n\
             └── index.html\n\n\
             Dependency install: {}\n\n\
             To start development:\n\
             cd {}\n\
             npm run dev",
            project_name, install_status, project_name
        ))
    }
}

/// Write the full scaffold tree to disk.
async fn write_project_tree(
    project_dir: &PathBuf,
    project_name: &str,
    app_name: &str,
    description: &str,
) -> anyhow::Result<()> {
    let components_dir = project_dir.join("src/components");
    tokio::fs::create_dir_all(&components_dir)
        .await
        .with_context(|| format!("failed to create {}", components_dir.display()))?;
    tokio::fs::create_dir_all(project_dir.join("public")).await?;

    let app_jsx = APP_JSX
        .replace("{{APP_NAME}}", app_name)
        .replace("{{DESCRIPTION}}", description);

    let files: [(&str, String); 10] = [
        ("package.json", render_package_json(project_name)),
        ("vite.config.js", VITE_CONFIG.to_string()),
        ("tailwind.config.js", TAILWIND_CONFIG.to_string()),
        ("postcss.config.js", POSTCSS_CONFIG.to_string()),
        ("index.html", render_index_html(app_name)),
        ("src/main.jsx", MAIN_JSX.to_string()),
        ("src/index.css", INDEX_CSS.to_string()),
        ("src/App.jsx", app_jsx),
        ("src/components/Header.jsx", HEADER_JSX.to_string()),
        ("src/components/MainContent.jsx", MAIN_CONTENT_JSX.to_string()),
    ];
    for (relative, content) in files {
        let path = project_dir.join(relative);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    tokio::fs::write(
        project_dir.join("src/components/Sidebar.jsx"),
        SIDEBAR_JSX,
    )
    .await?;

    Ok(())
}

/// Build a React project for production.
pub struct BuildReactProject;

#[derive(Deserialize)]
struct BuildReactProjectArgs {
    #[serde(default = "default_project_path")]
    project_path: String,
}

fn default_project_path() -> String {
    ".".to_string()
}

#[async_trait]
impl Tool for BuildReactProject {
    fn name(&self) -> &str {
        "build_react_project"
    }

    fn description(&self) -> &str {
        "Build a React project for production (npm run build). Input: { project_path? }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: BuildReactProjectArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for build_react_project: {}", e))?;
        let project_dir = workspace.join(&args.project_path);
        let result = run_shell("npm run build", &project_dir, 600).await?;
        Ok(format!("Build result:\n{}", result))
    }
}

/// Install a package into a React project directory.
pub struct InstallReactPackage;

#[derive(Deserialize)]
struct InstallReactPackageArgs {
    package_name: String,
    #[serde(default)]
    is_dev: bool,
    #[serde(default = "default_project_path")]
    project_path: String,
}

#[async_trait]
impl Tool for InstallReactPackage {
    fn name(&self) -> &str {
        "install_react_package"
    }

    fn description(&self) -> &str {
        "Install an npm package inside a React project directory. Input: { package_name, is_dev?, project_path? }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: InstallReactPackageArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for install_react_package: {}", e))?;
        let project_dir = workspace.join(&args.project_path);
        let command = if args.is_dev {
            format!("npm install --save-dev {}", args.package_name)
        } else {
            format!("npm install {}", args.package_name)
        };
        let result = run_shell(&command, &project_dir, 300).await?;
        Ok(format!("Package installation result:\n{}", result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_names_derive_from_app_type() {
        assert_eq!(app_name_for("custom"), "My App");
        assert_eq!(app_name_for(""), "My App");
        assert_eq!(app_name_for("dashboard"), "Dashboard");
    }

    #[test]
    fn package_json_carries_the_project_name() {
        let rendered = render_package_json("my-portfolio");
        assert!(rendered.contains(r#""name": "my-portfolio""#));
        assert!(!rendered.contains("{{PROJECT_NAME}}"));
    }

    #[tokio::test]
    async fn project_tree_is_complete_and_parameterized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = dir.path().join("demo-app");
        write_project_tree(&project, "demo-app", "Demo", "A demo of things.")
            .await
            .expect("tree writes");

        for file in [
            "package.json",
            "vite.config.js",
            "tailwind.config.js",
            "postcss.config.js",
            "index.html",
            "src/main.jsx",
            "src/index.css",
            "src/App.jsx",
            "src/components/Header.jsx",
            "src/components/MainContent.jsx",
            "src/components/Sidebar.jsx",
        ] {
            assert!(project.join(file).is_file(), "missing {}", file);
        }

        let app = tokio::fs::read_to_string(project.join("src/App.jsx"))
            .await
            .expect("read App.jsx");
        assert!(app.contains(r#"appName="Demo""#));
        assert!(app.contains("A demo of things."));

        let html = tokio::fs::read_to_string(project.join("index.html"))
            .await
            .expect("read index.html");
        assert!(html.contains("<title>Demo</title>"));
    }
}
