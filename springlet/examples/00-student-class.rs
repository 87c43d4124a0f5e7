use springlet::component::BeanPtr;
use springlet::context::ApplicationContext;
use springlet::Component;
use tracing_subscriber::EnvFilter;

// components live in a dedicated module, which is the package we're going to scan
mod entity {
    use super::*;

    // explicit name - other components refer to it by "cls"
    #[derive(Component)]
    #[component(name = "cls")]
    pub struct Class {
        #[value("1001")]
        pub cid: i32,
        #[value("精英班")]
        pub class_name: String,
    }

    #[derive(Component)]
    #[component(name = "stu")]
    pub struct Student {
        #[value("2021100101")]
        pub sid: i32,
        #[value("张三")]
        pub name: String,
        #[value("男")]
        pub sex: String,
        // without the qualifier, a component named "class" would be looked up
        #[autowired]
        #[qualifier("cls")]
        pub clazz: Option<BeanPtr<Class>>,
    }
}

fn main() {
    // try running with RUST_LOG=springlet=debug to see the bootstrap sequence
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let context = ApplicationContext::new(concat!(module_path!(), "::entity"));
    for diagnostic in context.diagnostics() {
        eprintln!("{diagnostic}");
    }

    let student = match context.get_bean_typed::<entity::Student>("stu") {
        Ok(student) => student,
        Err(error) => {
            eprintln!("{error}");
            return;
        }
    };

    let student = student.borrow();
    println!("{} ({}, {})", student.name, student.sid, student.sex);

    if let Some(class) = &student.clazz {
        let class = class.borrow();
        println!("attends {} ({})", class.class_name, class.cid);
    }
}
