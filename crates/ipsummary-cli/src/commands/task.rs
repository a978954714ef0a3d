//! `task`: task-directory bookkeeping

use crate::cli::{TaskAction, TaskArgs};
use crate::error::Result;
use crate::tasks::{Task, TaskManager};

fn print_task(task: &Task) {
    println!(
        "{}  {}  [{}]  my_party={}  created={}",
        task.id, task.name, task.status, task.my_party, task.created_at
    );
    if let Some(message) = &task.message {
        println!("    message: {message}");
    }
}

pub fn execute_task(args: TaskArgs) -> Result<()> {
    let manager = TaskManager::new(&args.task_root)?;
    match args.action {
        TaskAction::New { name, my_party } => {
            let task = manager.create_task(&name, &my_party)?;
            println!("Created task {} under {}", task.id, args.task_root.display());
            print_task(&task);
        }
        TaskAction::List => {
            let tasks = manager.list_tasks()?;
            if tasks.is_empty() {
                println!("No tasks under {}", args.task_root.display());
            }
            for task in &tasks {
                print_task(task);
            }
        }
        TaskAction::Show { id } => {
            let task = manager.get_task(&id)?;
            print_task(&task);
            println!("    input:        {}", task.input_dir.display());
            println!("    intermediate: {}", task.intermediate_dir.display());
            println!("    final:        {}", task.final_dir.display());
        }
    }
    Ok(())
}
